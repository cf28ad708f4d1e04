// Core models
pub mod category;
pub mod inventory;
pub mod sales;
pub mod supplier;

pub use category::Category;
pub use inventory::{InventoryRow, MovementType, SkuRecord, StockoutRisk};
pub use sales::{SalesRecord, SalesRow};
pub use supplier::{Rating, SupplierRecord, SupplierRow, SupplierScorecard};

/// Everything one synthesis pass produces; recreated on every run.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticDataset {
    pub inventory: Vec<SkuRecord>,
    pub sales: Vec<SalesRecord>,
    pub suppliers: Vec<SupplierRecord>,
}
