//! Synthetic data generation
//!
//! Produces plausible inventory, daily sales and monthly supplier performance
//! tables from a single seeded stream. The stream is consumed in a fixed
//! order (inventory, sales, suppliers), so equal settings always produce
//! equal datasets.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use rust_decimal::Decimal;
use std::f64::consts::PI;
use tracing::{info, instrument};

use crate::{
    common::{round_to, SalesWindow, YearMonth},
    config::AppConfig,
    errors::AnalyticsError,
    models::{Category, SalesRecord, SkuRecord, SupplierRecord, SyntheticDataset},
};

pub const SUPPLIERS: [&str; 5] = [
    "SupplierA",
    "SupplierB",
    "SupplierC",
    "SupplierD",
    "SupplierE",
];

/// Lead time every supplier promises, in days
pub const PROMISED_LEAD_TIME: u32 = 14;

const SEASONALITY_AMPLITUDE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisSettings {
    pub seed: u64,
    pub sku_count: usize,
    pub year: i32,
    pub lead_time_days: u32,
}

impl From<&AppConfig> for SynthesisSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            seed: config.seed,
            sku_count: config.sku_count,
            year: config.year,
            lead_time_days: config.lead_time_days,
        }
    }
}

pub struct DataSynthesizer {
    settings: SynthesisSettings,
    window: SalesWindow,
    rng: ChaCha8Rng,
    noise: Normal<f64>,
}

impl DataSynthesizer {
    pub fn new(settings: SynthesisSettings) -> Result<Self, AnalyticsError> {
        let window = SalesWindow::for_year(settings.year)?;
        let noise = Normal::new(1.0, 0.1)
            .map_err(|e| AnalyticsError::InvalidInput(format!("Invalid demand noise: {}", e)))?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            settings,
            window,
            noise,
        })
    }

    /// Generates all three tables.
    #[instrument(skip(self), fields(seed = self.settings.seed))]
    pub fn generate(&mut self) -> SyntheticDataset {
        let inventory = self.generate_inventory();
        let sales = self.generate_sales();
        let suppliers = self.generate_supplier_performance();

        info!(
            inventory = inventory.len(),
            sales = sales.len(),
            suppliers = suppliers.len(),
            "Data generated"
        );

        SyntheticDataset {
            inventory,
            sales,
            suppliers,
        }
    }

    pub fn generate_inventory(&mut self) -> Vec<SkuRecord> {
        let categories = Category::all();
        let lead_time = self.settings.lead_time_days;

        (1..=self.settings.sku_count)
            .map(|i| {
                let category = categories[self.rng.gen_range(0..categories.len())];
                let supplier = SUPPLIERS[self.rng.gen_range(0..SUPPLIERS.len())].to_string();
                let opening_stock = self.rng.gen_range(50..500);
                let avg_daily_sales = round_to(self.rng.gen_range(1.0..20.0), 2);
                let current_stock = self.rng.gen_range(0..400);
                let unit_cost = Decimal::new(self.rng.gen_range(5_000..200_000), 2);
                let holding_cost_per_day = Decimal::new(self.rng.gen_range(50..500), 2);

                SkuRecord {
                    sku: format!("SKU-{:04}", i),
                    category,
                    supplier,
                    opening_stock,
                    current_stock,
                    avg_daily_sales,
                    lead_time_days: lead_time,
                    reorder_point: round_to(avg_daily_sales * lead_time as f64, 0),
                    unit_cost,
                    holding_cost_per_day,
                }
            })
            .collect()
    }

    /// One row per (date, category) across the configured year.
    pub fn generate_sales(&mut self) -> Vec<SalesRecord> {
        let categories = Category::all();
        let mut records = Vec::with_capacity(self.window.len() * categories.len());

        for date in self.window.days() {
            let month = YearMonth::of(date).month as f64;
            let seasonality = 1.0 + SEASONALITY_AMPLITUDE * (2.0 * PI * month / 12.0).sin();

            for category in &categories {
                let noise = self.noise.sample(&mut self.rng);
                let units = (category.base_daily_units() * seasonality * noise)
                    .floor()
                    .max(0.0) as u32;
                let unit_price = Decimal::new(self.rng.gen_range(50_000..200_000), 2);

                records.push(SalesRecord {
                    date,
                    category: *category,
                    units_sold: units,
                    revenue: unit_price * Decimal::from(units),
                });
            }
        }

        records
    }

    /// Twelve monthly rows per supplier.
    pub fn generate_supplier_performance(&mut self) -> Vec<SupplierRecord> {
        let months = YearMonth::months_of(self.settings.year);
        let mut records = Vec::with_capacity(SUPPLIERS.len() * months.len());

        for supplier in SUPPLIERS {
            for month in &months {
                let total_orders: u32 = self.rng.gen_range(20..80);
                let on_time_share: f64 = self.rng.gen_range(0.65..0.98);
                let defect_rate_pct = round_to(self.rng.gen_range(0.5..8.0), 2);
                let actual_lead_time = self.rng.gen_range(7..21);

                records.push(SupplierRecord {
                    supplier: supplier.to_string(),
                    month: *month,
                    total_orders,
                    on_time_deliveries: (total_orders as f64 * on_time_share).floor() as u32,
                    defect_rate_pct,
                    actual_lead_time,
                    promised_lead_time: PROMISED_LEAD_TIME,
                });
            }
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn settings(seed: u64) -> SynthesisSettings {
        SynthesisSettings {
            seed,
            sku_count: 100,
            year: 2024,
            lead_time_days: 14,
        }
    }

    #[test]
    fn table_sizes() {
        let data = DataSynthesizer::new(settings(42)).unwrap().generate();
        assert_eq!(data.inventory.len(), 100);
        assert_eq!(data.sales.len(), 366 * 5);
        assert_eq!(data.suppliers.len(), 5 * 12);
    }

    #[test]
    fn same_seed_same_data() {
        let a = DataSynthesizer::new(settings(42)).unwrap().generate();
        let b = DataSynthesizer::new(settings(42)).unwrap().generate();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_different_data() {
        let a = DataSynthesizer::new(settings(1)).unwrap().generate();
        let b = DataSynthesizer::new(settings(2)).unwrap().generate();
        assert_ne!(a.inventory, b.inventory);
    }

    #[test]
    fn inventory_values_stay_in_range() {
        let inventory = DataSynthesizer::new(settings(9)).unwrap().generate_inventory();
        for sku in &inventory {
            assert!((50..500).contains(&sku.opening_stock));
            assert!(sku.current_stock < 400);
            assert!(sku.avg_daily_sales >= 1.0 && sku.avg_daily_sales <= 20.0);
            assert!(sku.unit_cost >= Decimal::new(5_000, 2));
            assert!(sku.unit_cost < Decimal::new(200_000, 2));
            assert_eq!(sku.lead_time_days, 14);
            assert_eq!(sku.reorder_point, (sku.avg_daily_sales * 14.0).round());
        }
        assert_eq!(inventory[0].sku, "SKU-0001");
        assert_eq!(inventory[99].sku, "SKU-0100");
    }

    #[test]
    fn one_sales_row_per_date_and_category() {
        let sales = DataSynthesizer::new(settings(3)).unwrap().generate_sales();
        let keys: HashSet<_> = sales.iter().map(|r| (r.date, r.category)).collect();
        assert_eq!(keys.len(), sales.len());
        assert!(sales.iter().all(|r| r.revenue.scale() <= 2));
    }

    #[test]
    fn supplier_rows_respect_bounds() {
        let rows = DataSynthesizer::new(settings(5))
            .unwrap()
            .generate_supplier_performance();
        for row in &rows {
            assert!((20..80).contains(&row.total_orders));
            assert!(row.on_time_deliveries <= row.total_orders);
            assert!(row.has_valid_defect_rate());
            assert!((7..21).contains(&row.actual_lead_time));
            assert_eq!(row.promised_lead_time, PROMISED_LEAD_TIME);
        }
    }

    #[test]
    fn unrepresentable_year_is_rejected() {
        let mut s = settings(1);
        s.year = i32::MAX;
        assert!(DataSynthesizer::new(s).is_err());
    }
}
