use serde::{Deserialize, Serialize};

use crate::common::{round_to, YearMonth};

/// Monthly delivery performance of one supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub supplier: String,
    pub month: YearMonth,
    pub total_orders: u32,
    pub on_time_deliveries: u32,
    /// Percent of delivered units found defective, in [0, 100]
    pub defect_rate_pct: f64,
    pub actual_lead_time: u32,
    pub promised_lead_time: u32,
}

impl SupplierRecord {
    /// On-time delivery rate in percent, rounded to 2 dp.
    /// `None` for a month without orders.
    pub fn otd_rate(&self) -> Option<f64> {
        if self.total_orders == 0 {
            return None;
        }
        let on_time = self.on_time_deliveries.min(self.total_orders) as f64;
        Some(round_to(on_time / self.total_orders as f64 * 100.0, 2))
    }

    /// Actual minus promised lead time, in days.
    pub fn lead_time_variance(&self) -> i64 {
        self.actual_lead_time as i64 - self.promised_lead_time as i64
    }

    pub fn has_valid_defect_rate(&self) -> bool {
        self.defect_rate_pct.is_finite() && (0.0..=100.0).contains(&self.defect_rate_pct)
    }
}

/// One row of `supplier_data.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierRow {
    #[serde(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Month")]
    pub month: YearMonth,
    #[serde(rename = "Total_Orders")]
    pub total_orders: u32,
    #[serde(rename = "On_Time_Deliveries")]
    pub on_time_deliveries: u32,
    #[serde(rename = "Defect_Rate_Pct")]
    pub defect_rate_pct: f64,
    #[serde(rename = "Actual_Lead_Time")]
    pub actual_lead_time: u32,
    #[serde(rename = "Promised_Lead_Time")]
    pub promised_lead_time: u32,
    #[serde(rename = "OTD_Rate")]
    pub otd_rate: Option<f64>,
    #[serde(rename = "Lead_Time_Variance")]
    pub lead_time_variance: i64,
}

impl From<&SupplierRecord> for SupplierRow {
    fn from(record: &SupplierRecord) -> Self {
        Self {
            supplier: record.supplier.clone(),
            month: record.month,
            total_orders: record.total_orders,
            on_time_deliveries: record.on_time_deliveries,
            defect_rate_pct: record.defect_rate_pct,
            actual_lead_time: record.actual_lead_time,
            promised_lead_time: record.promised_lead_time,
            otd_rate: record.otd_rate(),
            lead_time_variance: record.lead_time_variance(),
        }
    }
}

/// Scorecard rating tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Rating {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    #[strum(serialize = "Needs Improvement")]
    NeedsImprovement,
}

/// Per-supplier aggregate; one row of `supplier_scorecard.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierScorecard {
    #[serde(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Avg_OTD_Rate")]
    pub avg_otd_rate: Option<f64>,
    #[serde(rename = "Avg_Defect_Rate")]
    pub avg_defect_rate: Option<f64>,
    #[serde(rename = "Avg_Lead_Time_Variance")]
    pub avg_lead_time_variance: Option<f64>,
    #[serde(rename = "Total_Orders")]
    pub total_orders: u64,
    #[serde(rename = "Months_Reported")]
    pub months_reported: usize,
    #[serde(rename = "Performance_Score")]
    pub performance_score: f64,
    #[serde(rename = "Rating")]
    pub rating: Rating,
    #[serde(rename = "Insufficient_Data")]
    pub insufficient_data: bool,
}
