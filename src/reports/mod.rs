use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::YearMonth;
use crate::models::{Category, MovementType, StockoutRisk, SupplierScorecard};
use crate::services::kpi::RiskThresholds;

pub mod dashboard;
pub mod export;
pub mod summary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskCounts {
    pub fn record(&mut self, risk: StockoutRisk) {
        match risk {
            StockoutRisk::High => self.high += 1,
            StockoutRisk::Medium => self.medium += 1,
            StockoutRisk::Low => self.low += 1,
        }
    }

    pub fn get(&self, risk: StockoutRisk) -> usize {
        match risk {
            StockoutRisk::High => self.high,
            StockoutRisk::Medium => self.medium,
            StockoutRisk::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementCounts {
    pub fast: usize,
    pub medium: usize,
    pub slow: usize,
}

impl MovementCounts {
    pub fn record(&mut self, movement: MovementType) {
        match movement {
            MovementType::Fast => self.fast += 1,
            MovementType::Medium => self.medium += 1,
            MovementType::Slow => self.slow += 1,
        }
    }

    pub fn get(&self, movement: MovementType) -> usize {
        match movement {
            MovementType::Fast => self.fast,
            MovementType::Medium => self.medium,
            MovementType::Slow => self.slow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighRiskSku {
    pub sku: String,
    pub category: Category,
    pub current_stock: u32,
    pub days_of_stock: f64,
    pub avg_daily_sales: f64,
}

/// Inventory health figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryKpis {
    pub sku_count: usize,
    pub total_inventory_value: Decimal,
    /// Thirty days of holding cost for current stock
    pub monthly_holding_cost: Decimal,
    pub high_risk_skus: usize,
    /// High or Medium risk: below the reorder threshold
    pub at_risk_skus: usize,
    pub slow_moving_skus: usize,
    /// SKUs with no demand, hence unbounded days of stock
    pub unbounded_cover_skus: usize,
    pub high_risk_pct: f64,
    pub slow_moving_pct: f64,
    pub risk_by_category: BTreeMap<Category, RiskCounts>,
    pub movement_by_category: BTreeMap<Category, MovementCounts>,
    pub value_by_category: BTreeMap<Category, Decimal>,
    pub top_high_risk: Vec<HighRiskSku>,
}

impl InventoryKpis {
    /// Risk counts across all categories.
    pub fn risk_totals(&self) -> RiskCounts {
        self.risk_by_category
            .values()
            .fold(RiskCounts::default(), |acc, c| RiskCounts {
                high: acc.high + c.high,
                medium: acc.medium + c.medium,
                low: acc.low + c.low,
            })
    }
}

/// Revenue aggregates; every figure is an exact sum of daily revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total_revenue: Decimal,
    pub total_units: u64,
    pub average_monthly_revenue: Decimal,
    pub monthly: BTreeMap<YearMonth, Decimal>,
    pub quarterly: BTreeMap<String, Decimal>,
    pub by_category: BTreeMap<Category, Decimal>,
    pub by_month_and_category: BTreeMap<YearMonth, BTreeMap<Category, Decimal>>,
}

/// Everything written to `kpi_summary.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    pub seed: u64,
    pub thresholds: RiskThresholds,
    pub inventory: InventoryKpis,
    pub sales: RevenueSummary,
    pub scorecards: Vec<SupplierScorecard>,
}
