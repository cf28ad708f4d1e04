//! Supply Chain Analytics Library
//!
//! Generates a synthetic supply chain dataset (inventory, daily sales and
//! monthly supplier performance), derives inventory and revenue KPIs, scores
//! suppliers, and writes CSV tables, a JSON KPI summary and a PNG dashboard.
//!
//! Runs are deterministic: the same configuration and seed produce
//! byte-identical tables.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod common;
pub mod config;
pub mod errors;
pub mod models;
pub mod reports;
pub mod services;

pub use crate::config::AppConfig;
pub use crate::errors::AnalyticsError;
pub use crate::services::analytics::{AnalysisOutcome, AnalyticsService};

/// Runs the full pipeline once with a validated configuration.
pub fn run(config: &AppConfig) -> Result<AnalysisOutcome, AnalyticsError> {
    config.validate_all()?;
    AnalyticsService::new(config.clone())?.run()
}
