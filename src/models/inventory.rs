use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use super::category::Category;

/// Raw synthesized SKU state, before any KPI derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuRecord {
    pub sku: String,
    pub category: Category,
    pub supplier: String,
    pub opening_stock: u32,
    /// Quantity on hand
    pub current_stock: u32,
    /// Average daily demand in units
    pub avg_daily_sales: f64,
    pub lead_time_days: u32,
    pub reorder_point: f64,
    pub unit_cost: Decimal,
    pub holding_cost_per_day: Decimal,
}

/// Stockout risk tier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum StockoutRisk {
    High,
    Medium,
    Low,
}

/// Demand-based movement bucket.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum MovementType {
    Fast,
    Medium,
    Slow,
}

/// One row of `inventory_data.csv`: the SKU plus everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRow {
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Category")]
    pub category: Category,
    #[serde(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Opening_Stock")]
    pub opening_stock: u32,
    #[serde(rename = "Current_Stock")]
    pub current_stock: u32,
    #[serde(rename = "Avg_Daily_Sales")]
    pub avg_daily_sales: f64,
    #[serde(rename = "Lead_Time_Days")]
    pub lead_time_days: u32,
    #[serde(rename = "Reorder_Point")]
    pub reorder_point: f64,
    /// `f64::INFINITY` when there is no demand
    #[serde(rename = "Days_of_Stock", serialize_with = "serialize_days")]
    pub days_of_stock: f64,
    #[serde(rename = "Stockout_Risk")]
    pub stockout_risk: StockoutRisk,
    #[serde(rename = "At_Risk")]
    pub at_risk: bool,
    #[serde(rename = "Movement_Type")]
    pub movement: MovementType,
    #[serde(rename = "Unit_Cost")]
    pub unit_cost: Decimal,
    #[serde(rename = "Holding_Cost_Per_Day")]
    pub holding_cost_per_day: Decimal,
    #[serde(rename = "Inventory_Value")]
    pub inventory_value: Decimal,
    #[serde(rename = "Holding_Cost_Total")]
    pub holding_cost_total: Decimal,
}

impl InventoryRow {
    pub fn has_unbounded_stock(&self) -> bool {
        self.days_of_stock.is_infinite()
    }
}

/// Writes finite values to one decimal place and unbounded cover as `inf`.
fn serialize_days<S: Serializer>(days: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if days.is_finite() {
        serializer.serialize_f64(crate::common::round_to(*days, 1))
    } else {
        serializer.serialize_str("inf")
    }
}
