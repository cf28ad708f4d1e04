use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument, warn};

use crate::{
    common::round_to,
    config::AppConfig,
    errors::AnalyticsError,
    models::{Category, InventoryRow, MovementType, SalesRecord, SkuRecord, StockoutRisk},
    reports::{HighRiskSku, InventoryKpis, MovementCounts, RevenueSummary, RiskCounts},
};

/// Days the holding cost total covers
const HOLDING_PERIOD_DAYS: i64 = 30;
/// How many high-risk SKUs the report lists
const TOP_HIGH_RISK: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskThresholds {
    /// Below this many days of stock a SKU is High risk
    pub critical_days: f64,
    /// Below this many days of stock a SKU is at risk
    pub reorder_days: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical_days: 7.0,
            reorder_days: 14.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementStrategy {
    /// Bucket by percentile rank of demand among all SKUs
    Percentile { slow_below: f64, fast_from: f64 },
    /// Bucket by absolute demand in units per day
    Fixed { fast_above: f64, medium_above: f64 },
}

impl MovementStrategy {
    pub fn percentile() -> Self {
        MovementStrategy::Percentile {
            slow_below: 0.33,
            fast_from: 0.67,
        }
    }

    pub fn fixed() -> Self {
        MovementStrategy::Fixed {
            fast_above: 10.0,
            medium_above: 5.0,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, AnalyticsError> {
        match name.to_ascii_lowercase().as_str() {
            "percentile" => Ok(Self::percentile()),
            "fixed" => Ok(Self::fixed()),
            other => Err(AnalyticsError::InvalidInput(format!(
                "Unknown movement strategy: {}",
                other
            ))),
        }
    }
}

/// Negative, NaN or infinite demand counts as no demand.
fn sanitize_demand(demand: f64) -> f64 {
    if demand.is_finite() && demand > 0.0 {
        demand
    } else {
        0.0
    }
}

/// Projected days until stock runs out. Zero demand never runs out.
pub fn days_of_stock(quantity: u32, avg_daily_demand: f64) -> f64 {
    let demand = sanitize_demand(avg_daily_demand);
    if demand == 0.0 {
        f64::INFINITY
    } else {
        quantity as f64 / demand
    }
}

pub fn classify_risk(days_of_stock: f64, thresholds: &RiskThresholds) -> StockoutRisk {
    if days_of_stock < thresholds.critical_days {
        StockoutRisk::High
    } else if days_of_stock < thresholds.reorder_days {
        StockoutRisk::Medium
    } else {
        StockoutRisk::Low
    }
}

/// Share of values strictly below each value, in [0, 1).
pub fn percentile_ranks(demands: &[f64]) -> Vec<f64> {
    let n = demands.len();
    if n == 0 {
        return Vec::new();
    }

    let mut sorted: Vec<f64> = demands.iter().map(|d| sanitize_demand(*d)).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    demands
        .iter()
        .map(|d| {
            let d = sanitize_demand(*d);
            sorted.partition_point(|x| *x < d) as f64 / n as f64
        })
        .collect()
}

pub fn classify_movement(demands: &[f64], strategy: &MovementStrategy) -> Vec<MovementType> {
    match *strategy {
        MovementStrategy::Percentile {
            slow_below,
            fast_from,
        } => percentile_ranks(demands)
            .into_iter()
            .map(|rank| {
                if rank >= fast_from {
                    MovementType::Fast
                } else if rank < slow_below {
                    MovementType::Slow
                } else {
                    MovementType::Medium
                }
            })
            .collect(),
        MovementStrategy::Fixed {
            fast_above,
            medium_above,
        } => demands
            .iter()
            .map(|d| {
                let d = sanitize_demand(*d);
                if d > fast_above {
                    MovementType::Fast
                } else if d > medium_above {
                    MovementType::Medium
                } else {
                    MovementType::Slow
                }
            })
            .collect(),
    }
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_to(count as f64 / total as f64 * 100.0, 1)
    }
}

/// Derives inventory health and revenue aggregates from synthesized tables
#[derive(Debug, Clone)]
pub struct KpiCalculator {
    thresholds: RiskThresholds,
    movement: MovementStrategy,
}

impl Default for KpiCalculator {
    fn default() -> Self {
        Self::new(RiskThresholds::default(), MovementStrategy::percentile())
    }
}

impl KpiCalculator {
    pub fn new(thresholds: RiskThresholds, movement: MovementStrategy) -> Self {
        Self {
            thresholds,
            movement,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AnalyticsError> {
        Ok(Self::new(
            RiskThresholds {
                critical_days: config.critical_days,
                reorder_days: config.reorder_days,
            },
            MovementStrategy::from_name(&config.movement_strategy)?,
        ))
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Joins each SKU with its days of stock, risk tier, movement bucket and
    /// stock valuation. Output order follows input order.
    #[instrument(skip(self, skus), fields(skus = skus.len()))]
    pub fn assess_inventory(&self, skus: &[SkuRecord]) -> Vec<InventoryRow> {
        let demands: Vec<f64> = skus.iter().map(|s| s.avg_daily_sales).collect();
        let movements = classify_movement(&demands, &self.movement);

        skus.iter()
            .zip(movements)
            .map(|(sku, movement)| {
                let days = days_of_stock(sku.current_stock, sku.avg_daily_sales);
                let stock = Decimal::from(sku.current_stock);
                InventoryRow {
                    sku: sku.sku.clone(),
                    category: sku.category,
                    supplier: sku.supplier.clone(),
                    opening_stock: sku.opening_stock,
                    current_stock: sku.current_stock,
                    avg_daily_sales: sku.avg_daily_sales,
                    lead_time_days: sku.lead_time_days,
                    reorder_point: sku.reorder_point,
                    days_of_stock: days,
                    stockout_risk: classify_risk(days, &self.thresholds),
                    at_risk: days < self.thresholds.reorder_days,
                    movement,
                    unit_cost: sku.unit_cost,
                    holding_cost_per_day: sku.holding_cost_per_day,
                    inventory_value: stock * sku.unit_cost,
                    holding_cost_total: stock
                        * sku.holding_cost_per_day
                        * Decimal::from(HOLDING_PERIOD_DAYS),
                }
            })
            .collect()
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn inventory_kpis(&self, rows: &[InventoryRow]) -> InventoryKpis {
        let mut risk_by_category: BTreeMap<Category, RiskCounts> = BTreeMap::new();
        let mut movement_by_category: BTreeMap<Category, MovementCounts> = BTreeMap::new();
        let mut value_by_category: BTreeMap<Category, Decimal> = BTreeMap::new();

        for row in rows {
            risk_by_category
                .entry(row.category)
                .or_default()
                .record(row.stockout_risk);
            movement_by_category
                .entry(row.category)
                .or_default()
                .record(row.movement);
            *value_by_category.entry(row.category).or_insert(Decimal::ZERO) +=
                row.inventory_value;
        }

        let high_risk_skus = rows
            .iter()
            .filter(|r| r.stockout_risk == StockoutRisk::High)
            .count();
        let slow_moving_skus = rows
            .iter()
            .filter(|r| r.movement == MovementType::Slow)
            .count();

        let top_high_risk = rows
            .iter()
            .filter(|r| r.stockout_risk == StockoutRisk::High)
            .take(TOP_HIGH_RISK)
            .map(|r| HighRiskSku {
                sku: r.sku.clone(),
                category: r.category,
                current_stock: r.current_stock,
                days_of_stock: round_to(r.days_of_stock, 1),
                avg_daily_sales: r.avg_daily_sales,
            })
            .collect();

        InventoryKpis {
            sku_count: rows.len(),
            total_inventory_value: rows.iter().map(|r| r.inventory_value).sum(),
            monthly_holding_cost: rows.iter().map(|r| r.holding_cost_total).sum(),
            high_risk_skus,
            at_risk_skus: rows.iter().filter(|r| r.at_risk).count(),
            slow_moving_skus,
            unbounded_cover_skus: rows.iter().filter(|r| r.has_unbounded_stock()).count(),
            high_risk_pct: pct(high_risk_skus, rows.len()),
            slow_moving_pct: pct(slow_moving_skus, rows.len()),
            risk_by_category,
            movement_by_category,
            value_by_category,
            top_high_risk,
        }
    }

    /// Sums revenue by category and month (plus monthly, quarterly and
    /// yearly totals). Rejects a second row for the same date and category.
    #[instrument(skip(self, sales), fields(rows = sales.len()))]
    pub fn aggregate_revenue(&self, sales: &[SalesRecord]) -> Result<RevenueSummary, AnalyticsError> {
        let mut seen = HashSet::with_capacity(sales.len());
        let mut monthly: BTreeMap<_, Decimal> = BTreeMap::new();
        let mut quarterly: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut by_category: BTreeMap<Category, Decimal> = BTreeMap::new();
        let mut by_month_and_category: BTreeMap<_, BTreeMap<Category, Decimal>> = BTreeMap::new();
        let mut total_revenue = Decimal::ZERO;
        let mut total_units: u64 = 0;

        for record in sales {
            if !seen.insert((record.date, record.category)) {
                warn!(date = %record.date, category = %record.category, "Duplicate sales row");
                return Err(AnalyticsError::InvalidInput(format!(
                    "Duplicate sales row for {} / {}",
                    record.date, record.category
                )));
            }

            let month = record.month();
            total_revenue += record.revenue;
            total_units += record.units_sold as u64;
            *monthly.entry(month).or_insert(Decimal::ZERO) += record.revenue;
            *quarterly.entry(month.quarter()).or_insert(Decimal::ZERO) += record.revenue;
            *by_category.entry(record.category).or_insert(Decimal::ZERO) += record.revenue;
            *by_month_and_category
                .entry(month)
                .or_default()
                .entry(record.category)
                .or_insert(Decimal::ZERO) += record.revenue;
        }

        let average_monthly_revenue = if monthly.is_empty() {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(monthly.len() as u64))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };

        debug!(months = monthly.len(), %total_revenue, "Revenue aggregated");

        Ok(RevenueSummary {
            total_revenue,
            total_units,
            average_monthly_revenue,
            monthly,
            quarterly,
            by_category,
            by_month_and_category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::YearMonth;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sku(id: &str, category: Category, stock: u32, demand: f64) -> SkuRecord {
        SkuRecord {
            sku: id.into(),
            category,
            supplier: "SupplierA".into(),
            opening_stock: 100,
            current_stock: stock,
            avg_daily_sales: demand,
            lead_time_days: 14,
            reorder_point: (demand * 14.0).round(),
            unit_cost: dec!(10.00),
            holding_cost_per_day: dec!(0.50),
        }
    }

    fn sale(day: u32, month: u32, category: Category, revenue: Decimal) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
            category,
            units_sold: 1,
            revenue,
        }
    }

    #[test]
    fn zero_demand_is_unbounded_and_low_risk() {
        let days = days_of_stock(50, 0.0);
        assert!(days.is_infinite());
        assert_eq!(classify_risk(days, &RiskThresholds::default()), StockoutRisk::Low);
        assert!(days_of_stock(0, 0.0).is_infinite());
        assert!(days_of_stock(10, -3.0).is_infinite());
        assert!(days_of_stock(10, f64::NAN).is_infinite());
    }

    #[test]
    fn risk_tiers_follow_thresholds() {
        let t = RiskThresholds::default();
        assert_eq!(classify_risk(0.0, &t), StockoutRisk::High);
        assert_eq!(classify_risk(6.99, &t), StockoutRisk::High);
        assert_eq!(classify_risk(7.0, &t), StockoutRisk::Medium);
        assert_eq!(classify_risk(13.9, &t), StockoutRisk::Medium);
        assert_eq!(classify_risk(14.0, &t), StockoutRisk::Low);
    }

    #[test]
    fn percentile_ranks_handle_ties() {
        let ranks = percentile_ranks(&[5.0, 1.0, 5.0, 9.0]);
        assert_eq!(ranks, vec![0.25, 0.0, 0.25, 0.75]);
        assert!(percentile_ranks(&[]).is_empty());
    }

    #[test]
    fn percentile_movement_buckets_by_rank() {
        let demands: Vec<f64> = (1..=10).map(|d| d as f64).collect();
        let buckets = classify_movement(&demands, &MovementStrategy::percentile());
        let slow = buckets.iter().filter(|b| **b == MovementType::Slow).count();
        let fast = buckets.iter().filter(|b| **b == MovementType::Fast).count();
        assert_eq!(slow, 4);
        assert_eq!(fast, 3);
        assert_eq!(buckets[0], MovementType::Slow);
        assert_eq!(buckets[9], MovementType::Fast);
    }

    #[test]
    fn fixed_movement_uses_absolute_demand() {
        let buckets = classify_movement(&[12.0, 10.0, 6.0, 5.0], &MovementStrategy::fixed());
        assert_eq!(
            buckets,
            vec![
                MovementType::Fast,
                MovementType::Medium,
                MovementType::Medium,
                MovementType::Slow
            ]
        );
    }

    #[test]
    fn unknown_strategy_name_is_rejected() {
        assert!(MovementStrategy::from_name("median").is_err());
        assert_eq!(
            MovementStrategy::from_name("Fixed").unwrap(),
            MovementStrategy::fixed()
        );
    }

    #[test]
    fn assessment_values_stock() {
        let calc = KpiCalculator::default();
        let rows = calc.assess_inventory(&[
            sku("SKU-0001", Category::Textiles, 20, 10.0),
            sku("SKU-0002", Category::Textiles, 100, 10.0),
            sku("SKU-0003", Category::Furniture, 300, 10.0),
            sku("SKU-0004", Category::Furniture, 30, 0.0),
        ]);

        assert_eq!(rows[0].stockout_risk, StockoutRisk::High);
        assert!(rows[0].at_risk);
        assert_eq!(rows[1].stockout_risk, StockoutRisk::Medium);
        assert!(rows[1].at_risk);
        assert_eq!(rows[2].stockout_risk, StockoutRisk::Low);
        assert!(!rows[2].at_risk);
        assert!(rows[3].has_unbounded_stock());
        assert!(!rows[3].at_risk);

        assert_eq!(rows[0].inventory_value, dec!(200.00));
        assert_eq!(rows[0].holding_cost_total, dec!(300.00));
    }

    #[test]
    fn inventory_kpis_count_and_sum() {
        let calc = KpiCalculator::default();
        let rows = calc.assess_inventory(&[
            sku("SKU-0001", Category::Textiles, 20, 10.0),
            sku("SKU-0002", Category::Textiles, 10, 10.0),
            sku("SKU-0003", Category::Furniture, 300, 10.0),
            sku("SKU-0004", Category::Furniture, 30, 0.0),
        ]);
        let kpis = calc.inventory_kpis(&rows);

        assert_eq!(kpis.sku_count, 4);
        assert_eq!(kpis.high_risk_skus, 2);
        assert_eq!(kpis.at_risk_skus, 2);
        assert_eq!(kpis.unbounded_cover_skus, 1);
        assert_eq!(kpis.high_risk_pct, 50.0);
        assert_eq!(kpis.total_inventory_value, dec!(3600.00));
        assert_eq!(kpis.risk_by_category[&Category::Textiles].high, 2);
        assert_eq!(kpis.value_by_category[&Category::Furniture], dec!(3300.00));
        assert_eq!(kpis.top_high_risk.len(), 2);
        assert_eq!(kpis.top_high_risk[0].sku, "SKU-0001");
        assert_eq!(kpis.risk_totals().total(), 4);
    }

    #[test]
    fn revenue_sums_by_month_and_category() {
        let calc = KpiCalculator::default();
        let sales = vec![
            sale(1, 1, Category::Textiles, dec!(100.10)),
            sale(2, 1, Category::Textiles, dec!(200.20)),
            sale(1, 1, Category::Packaging, dec!(0.01)),
            sale(1, 4, Category::Packaging, dec!(50.00)),
        ];
        let summary = calc.aggregate_revenue(&sales).unwrap();
        let jan = YearMonth::new(2024, 1).unwrap();
        let apr = YearMonth::new(2024, 4).unwrap();

        assert_eq!(summary.total_revenue, dec!(350.31));
        assert_eq!(summary.monthly[&jan], dec!(300.31));
        assert_eq!(summary.by_month_and_category[&jan][&Category::Textiles], dec!(300.30));
        assert_eq!(summary.by_month_and_category[&apr][&Category::Packaging], dec!(50.00));
        assert_eq!(summary.quarterly["2024Q1"], dec!(300.31));
        assert_eq!(summary.quarterly["2024Q2"], dec!(50.00));
        assert_eq!(summary.average_monthly_revenue, dec!(175.16));
        assert_eq!(summary.total_units, 4);
    }

    #[test]
    fn duplicate_sales_rows_are_rejected() {
        let calc = KpiCalculator::default();
        let sales = vec![
            sale(1, 1, Category::Textiles, dec!(1)),
            sale(1, 1, Category::Textiles, dec!(2)),
        ];
        let err = calc.aggregate_revenue(&sales).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }

    #[test]
    fn empty_sales_aggregate_to_zero() {
        let summary = KpiCalculator::default().aggregate_revenue(&[]).unwrap();
        assert_eq!(summary.total_revenue, Decimal::ZERO);
        assert_eq!(summary.average_monthly_revenue, Decimal::ZERO);
        assert!(summary.monthly.is_empty());
    }
}
