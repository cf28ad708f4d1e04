use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Product category carried by SKUs and sales rows.
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
pub enum Category {
    Electronics,
    Textiles,
    Furniture,
    Packaging,
    #[serde(rename = "Raw Materials")]
    #[strum(serialize = "Raw Materials")]
    RawMaterials,
}

impl Category {
    /// Baseline units sold per day before seasonality and noise.
    pub fn base_daily_units(&self) -> f64 {
        match self {
            Category::Electronics => 150.0,
            Category::Textiles => 200.0,
            Category::Furniture => 80.0,
            Category::Packaging => 300.0,
            Category::RawMaterials => 250.0,
        }
    }

    pub fn all() -> Vec<Category> {
        Category::iter().collect()
    }
}
