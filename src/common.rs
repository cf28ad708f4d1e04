/// Common types and utilities shared across models and services
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::AnalyticsError;

/// Rounds half away from zero to `dp` decimal places.
pub fn round_to(value: f64, dp: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Calendar month key, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, AnalyticsError> {
        if !(1..=12).contains(&month) {
            return Err(AnalyticsError::InvalidInput(format!(
                "Month out of range: {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Quarter label in `YYYYQn` form.
    pub fn quarter(&self) -> String {
        format!("{}Q{}", self.year, (self.month - 1) / 3 + 1)
    }

    /// All twelve months of a year, in order.
    pub fn months_of(year: i32) -> Vec<YearMonth> {
        (1..=12).map(|month| YearMonth { year, month }).collect()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| AnalyticsError::InvalidInput(format!("Invalid month: {}", s)))?;
        let year = year
            .parse::<i32>()
            .map_err(|e| AnalyticsError::InvalidInput(format!("Invalid year in {}: {}", s, e)))?;
        let month = month
            .parse::<u32>()
            .map_err(|e| AnalyticsError::InvalidInput(format!("Invalid month in {}: {}", s, e)))?;
        YearMonth::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive daily window covering one calendar year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SalesWindow {
    pub fn for_year(year: i32) -> Result<Self, AnalyticsError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| AnalyticsError::InvalidInput(format!("Invalid start year: {}", year)))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| AnalyticsError::InvalidInput(format!("Invalid end year: {}", year)))?;
        Ok(Self { start, end })
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}
