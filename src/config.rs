use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::env as std_env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
pub const CONFIG_DIR: &str = "config";
const DEFAULT_SEED: u64 = 42;
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_SKU_COUNT: usize = 100;
const DEFAULT_YEAR: i32 = 2024;
const DEFAULT_LEAD_TIME_DAYS: u32 = 14;
const DEFAULT_CRITICAL_DAYS: f64 = 7.0;
const DEFAULT_REORDER_DAYS: f64 = 14.0;
const DEFAULT_MOVEMENT_STRATEGY: &str = "percentile";
const DEFAULT_DASHBOARD_FILE: &str = "supply_chain_dashboard.png";
const DEFAULT_DASHBOARD_WIDTH: u32 = 3000;
const DEFAULT_DASHBOARD_HEIGHT: u32 = 2400;

/// Supplier scoring configuration
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Weight applied to the average on-time-delivery rate (percent)
    #[serde(default = "default_otd_weight")]
    pub otd_weight: f64,

    /// Penalty per percentage point of average defect rate
    #[serde(default = "default_defect_penalty")]
    pub defect_penalty: f64,

    /// Penalty per day of average lead time variance
    #[serde(default = "default_lead_time_penalty")]
    pub lead_time_penalty: f64,

    /// Scores strictly above this are rated Excellent
    #[serde(default = "default_excellent_above")]
    pub excellent_above: f64,

    /// Scores strictly above this are rated Good
    #[serde(default = "default_good_above")]
    pub good_above: f64,

    /// Lower bound of the score scale; also the worst-case score
    #[serde(default)]
    pub scale_min: f64,

    /// Upper bound of the score scale
    #[serde(default = "default_scale_max")]
    pub scale_max: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            otd_weight: default_otd_weight(),
            defect_penalty: default_defect_penalty(),
            lead_time_penalty: default_lead_time_penalty(),
            excellent_above: default_excellent_above(),
            good_above: default_good_above(),
            scale_min: 0.0,
            scale_max: default_scale_max(),
        }
    }
}

impl ScoringConfig {
    fn validate_bounds(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let finite = [
            self.otd_weight,
            self.defect_penalty,
            self.lead_time_penalty,
            self.excellent_above,
            self.good_above,
            self.scale_min,
            self.scale_max,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            let mut err = ValidationError::new("scoring_not_finite");
            err.message = Some("All scoring values must be finite numbers".into());
            errors.add("scoring", err);
        }

        if self.scale_min >= self.scale_max {
            let mut err = ValidationError::new("scoring_scale");
            err.message = Some("scoring.scale_min must be below scoring.scale_max".into());
            errors.add("scoring", err);
        }

        if self.good_above > self.excellent_above {
            let mut err = ValidationError::new("scoring_tiers");
            err.message =
                Some("scoring.good_above must not exceed scoring.excellent_above".into());
            errors.add("scoring", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Seed for the synthetic data stream; equal seeds give identical exports
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Directory receiving CSV, JSON and PNG outputs
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Number of SKUs to synthesize (SKU-0001 ..)
    #[serde(default = "default_sku_count")]
    #[validate(range(min = 1, max = 9999))]
    pub sku_count: usize,

    /// Calendar year covered by the daily sales history
    #[serde(default = "default_year")]
    #[validate(range(min = 1970, max = 2999))]
    pub year: i32,

    /// Replenishment lead time used for reorder points
    #[serde(default = "default_lead_time_days")]
    #[validate(range(min = 1, max = 365))]
    pub lead_time_days: u32,

    /// Days of stock below which a SKU is High risk
    #[serde(default = "default_critical_days")]
    pub critical_days: f64,

    /// Days of stock below which a SKU is at risk (Medium when above critical)
    #[serde(default = "default_reorder_days")]
    pub reorder_days: f64,

    /// Movement classification: "percentile" or "fixed"
    #[serde(default = "default_movement_strategy")]
    #[validate(custom = "validate_movement_strategy")]
    pub movement_strategy: String,

    /// Whether to draw the PNG dashboard
    #[serde(default = "default_true_bool")]
    pub render_dashboard: bool,

    /// Dashboard file name inside the output directory
    #[serde(default = "default_dashboard_file")]
    pub dashboard_file: String,

    /// Dashboard width in pixels
    #[serde(default = "default_dashboard_width")]
    #[validate(range(min = 300, max = 8000))]
    pub dashboard_width: u32,

    /// Dashboard height in pixels
    #[serde(default = "default_dashboard_height")]
    #[validate(range(min = 300, max = 8000))]
    pub dashboard_height: u32,

    /// Supplier scoring configuration
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SEED, DEFAULT_OUTPUT_DIR.into(), DEFAULT_ENV.into())
    }
}

impl AppConfig {
    /// Creates a new configuration
    pub fn new(seed: u64, output_dir: String, environment: String) -> Self {
        Self {
            environment,
            log_level: default_log_level(),
            log_json: false,
            seed,
            output_dir,
            sku_count: default_sku_count(),
            year: default_year(),
            lead_time_days: default_lead_time_days(),
            critical_days: default_critical_days(),
            reorder_days: default_reorder_days(),
            movement_strategy: default_movement_strategy(),
            render_dashboard: true,
            dashboard_file: default_dashboard_file(),
            dashboard_width: default_dashboard_width(),
            dashboard_height: default_dashboard_height(),
            scoring: ScoringConfig::default(),
        }
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Output directory as a path
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    /// Full path of the dashboard image
    pub fn dashboard_path(&self) -> PathBuf {
        self.output_path().join(&self.dashboard_file)
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Runs derive-based validation plus cross-field checks
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        self.validate_additional_constraints()?;
        self.scoring.validate_bounds()
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.critical_days.is_finite() || self.critical_days < 0.0 {
            let mut err = ValidationError::new("critical_days");
            err.message = Some("critical_days must be a finite, non-negative number".into());
            errors.add("critical_days", err);
        }

        if !self.reorder_days.is_finite() || self.reorder_days < self.critical_days {
            let mut err = ValidationError::new("reorder_days");
            err.message = Some("reorder_days must be finite and at least critical_days".into());
            errors.add("reorder_days", err);
        }

        if self.output_dir.trim().is_empty() {
            let mut err = ValidationError::new("output_dir");
            err.message = Some("output_dir must not be empty".into());
            errors.add("output_dir", err);
        }

        if !self.dashboard_file.to_ascii_lowercase().ends_with(".png") {
            let mut err = ValidationError::new("dashboard_file");
            err.message = Some("dashboard_file must name a .png file".into());
            errors.add("dashboard_file", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_sku_count() -> usize {
    DEFAULT_SKU_COUNT
}

fn default_year() -> i32 {
    DEFAULT_YEAR
}

fn default_lead_time_days() -> u32 {
    DEFAULT_LEAD_TIME_DAYS
}

fn default_critical_days() -> f64 {
    DEFAULT_CRITICAL_DAYS
}

fn default_reorder_days() -> f64 {
    DEFAULT_REORDER_DAYS
}

fn default_movement_strategy() -> String {
    DEFAULT_MOVEMENT_STRATEGY.to_string()
}

fn default_true_bool() -> bool {
    true
}

fn default_dashboard_file() -> String {
    DEFAULT_DASHBOARD_FILE.to_string()
}

fn default_dashboard_width() -> u32 {
    DEFAULT_DASHBOARD_WIDTH
}

fn default_dashboard_height() -> u32 {
    DEFAULT_DASHBOARD_HEIGHT
}

fn default_otd_weight() -> f64 {
    0.5
}

fn default_defect_penalty() -> f64 {
    3.0
}

fn default_lead_time_penalty() -> f64 {
    2.0
}

fn default_excellent_above() -> f64 {
    40.0
}

fn default_good_above() -> f64 {
    30.0
}

fn default_scale_max() -> f64 {
    100.0
}

fn validate_movement_strategy(value: &str) -> Result<(), ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "percentile" | "fixed" => Ok(()),
        _ => {
            let mut err = ValidationError::new("movement_strategy");
            err.message = Some("Must be one of: percentile, fixed".into());
            Err(err)
        }
    }
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter.
/// Logs go to stderr so stdout stays free for `--json` output.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("supply_chain_analytics={}", level);
    let filter_directive = std_env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .with_writer(std::io::stderr)
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Loads application configuration from the default `config` directory
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (`{dir}/default.toml`)
/// 3. Environment-specific config (`{dir}/{env}.toml`)
/// 4. Environment variables (APP__*)
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let dir = config_dir.display().to_string();
    let config = Config::builder()
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", dir)).required(false))
        .add_source(File::with_name(&format!("{}/{}", dir, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate_all().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig::new(7, "out".into(), "production".into())
    }

    #[test]
    fn defaults_are_valid() {
        assert!(base_config().validate_all().is_ok());
        assert!(AppConfig::default().validate_all().is_ok());
    }

    #[test]
    fn reorder_below_critical_is_rejected() {
        let mut cfg = base_config();
        cfg.critical_days = 10.0;
        cfg.reorder_days = 5.0;
        let errors = cfg.validate_all().unwrap_err();
        assert!(errors.errors().contains_key("reorder_days"));
    }

    #[test]
    fn unknown_movement_strategy_is_rejected() {
        let mut cfg = base_config();
        cfg.movement_strategy = "abc".into();
        assert!(cfg.validate_all().is_err());
        cfg.movement_strategy = "FIXED".into();
        assert!(cfg.validate_all().is_ok());
    }

    #[test]
    fn inverted_scoring_scale_is_rejected() {
        let mut cfg = base_config();
        cfg.scoring.scale_min = 50.0;
        cfg.scoring.scale_max = 10.0;
        let errors = cfg.validate_all().unwrap_err();
        assert!(errors.errors().contains_key("scoring"));
    }

    #[test]
    fn zero_sku_count_is_rejected() {
        let mut cfg = base_config();
        cfg.sku_count = 0;
        let errors = cfg.validate_all().unwrap_err();
        assert!(errors.field_errors().contains_key("sku_count"));
    }

    #[test]
    fn dashboard_must_be_png() {
        let mut cfg = base_config();
        cfg.dashboard_file = "dash.svg".into();
        assert!(cfg.validate_all().is_err());
    }
}
