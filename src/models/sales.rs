use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::common::YearMonth;

/// Daily units and revenue for one category. One row per (date, category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub category: Category,
    pub units_sold: u32,
    pub revenue: Decimal,
}

impl SalesRecord {
    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }
}

/// One row of `sales_data.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Category")]
    pub category: Category,
    #[serde(rename = "Units_Sold")]
    pub units_sold: u32,
    #[serde(rename = "Revenue")]
    pub revenue: Decimal,
    #[serde(rename = "Month")]
    pub month: YearMonth,
    #[serde(rename = "Quarter")]
    pub quarter: String,
}

impl From<&SalesRecord> for SalesRow {
    fn from(record: &SalesRecord) -> Self {
        let month = record.month();
        Self {
            date: record.date,
            category: record.category,
            units_sold: record.units_sold,
            revenue: record.revenue,
            month,
            quarter: month.quarter(),
        }
    }
}
