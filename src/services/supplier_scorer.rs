use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use crate::{
    common::{mean, round_to},
    config::ScoringConfig,
    models::{Rating, SupplierRecord, SupplierScorecard},
};

/// Turns monthly supplier rows into one weighted scorecard per supplier.
#[derive(Debug, Clone, Default)]
pub struct SupplierScorer {
    config: ScoringConfig,
}

impl SupplierScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Weighted score on the configured scale, rounded to 2 dp.
    ///
    /// Higher on-time delivery raises the score; defects and late delivery
    /// lower it. Early delivery (negative variance) adds to it.
    pub fn score(&self, avg_otd: f64, avg_defect: f64, avg_variance: f64) -> f64 {
        let raw = self.config.otd_weight * avg_otd
            - self.config.defect_penalty * avg_defect
            - self.config.lead_time_penalty * avg_variance;

        if !raw.is_finite() {
            return self.config.scale_min;
        }
        round_to(raw, 2).clamp(self.config.scale_min, self.config.scale_max)
    }

    pub fn rate(&self, score: f64) -> Rating {
        if score > self.config.excellent_above {
            Rating::Excellent
        } else if score > self.config.good_above {
            Rating::Good
        } else {
            Rating::NeedsImprovement
        }
    }

    /// One scorecard per supplier, ordered by supplier name.
    ///
    /// Months without orders carry no delivery information and are left out
    /// of every average, as are months with an out-of-range defect rate. A
    /// supplier with no usable month gets the worst score on the scale.
    #[instrument(skip(self, records), fields(rows = records.len()))]
    pub fn scorecards(&self, records: &[SupplierRecord]) -> Vec<SupplierScorecard> {
        let mut by_supplier: BTreeMap<&str, Vec<&SupplierRecord>> = BTreeMap::new();
        for record in records {
            by_supplier
                .entry(record.supplier.as_str())
                .or_default()
                .push(record);
        }

        by_supplier
            .into_iter()
            .map(|(supplier, rows)| self.scorecard(supplier, &rows))
            .collect()
    }

    fn scorecard(&self, supplier: &str, rows: &[&SupplierRecord]) -> SupplierScorecard {
        let usable: Vec<&SupplierRecord> = rows
            .iter()
            .copied()
            .filter(|r| r.total_orders > 0 && r.has_valid_defect_rate())
            .collect();

        let otd: Vec<f64> = usable.iter().filter_map(|r| r.otd_rate()).collect();
        let defects: Vec<f64> = usable.iter().map(|r| r.defect_rate_pct).collect();
        let variances: Vec<f64> = usable
            .iter()
            .map(|r| r.lead_time_variance() as f64)
            .collect();

        let avg_otd_rate = mean(&otd).map(|v| round_to(v, 2));
        let avg_defect_rate = mean(&defects).map(|v| round_to(v, 2));
        let avg_lead_time_variance = mean(&variances).map(|v| round_to(v, 2));

        let total_orders = rows.iter().map(|r| r.total_orders as u64).sum();

        match (avg_otd_rate, avg_defect_rate, avg_lead_time_variance) {
            (Some(otd), Some(defect), Some(variance)) => {
                let performance_score = self.score(otd, defect, variance);
                debug!(supplier, performance_score, "Supplier scored");
                SupplierScorecard {
                    supplier: supplier.to_string(),
                    avg_otd_rate,
                    avg_defect_rate,
                    avg_lead_time_variance,
                    total_orders,
                    months_reported: usable.len(),
                    performance_score,
                    rating: self.rate(performance_score),
                    insufficient_data: false,
                }
            }
            _ => {
                warn!(supplier, months = rows.len(), "No usable supplier months");
                SupplierScorecard {
                    supplier: supplier.to_string(),
                    avg_otd_rate: None,
                    avg_defect_rate: None,
                    avg_lead_time_variance: None,
                    total_orders,
                    months_reported: 0,
                    performance_score: self.config.scale_min,
                    rating: Rating::NeedsImprovement,
                    insufficient_data: true,
                }
            }
        }
    }
}
