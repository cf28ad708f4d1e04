use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::{
    errors::AnalyticsError,
    models::{SalesRow, SupplierRow},
    reports::KpiReport,
    services::analytics::Analysis,
};

pub const INVENTORY_FILE: &str = "inventory_data.csv";
pub const SALES_FILE: &str = "sales_data.csv";
pub const SUPPLIER_FILE: &str = "supplier_data.csv";
pub const SCORECARD_FILE: &str = "supplier_scorecard.csv";
pub const SUMMARY_FILE: &str = "kpi_summary.json";

/// Paths of every file one export wrote
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFiles {
    pub inventory: PathBuf,
    pub sales: PathBuf,
    pub suppliers: PathBuf,
    pub scorecard: PathBuf,
    pub summary: PathBuf,
}

impl ExportedFiles {
    pub fn all(&self) -> [&Path; 5] {
        [
            &self.inventory,
            &self.sales,
            &self.suppliers,
            &self.scorecard,
            &self.summary,
        ]
    }
}

/// Writes tables as CSV with a header row and the KPI report as JSON.
/// Existing files are overwritten.
pub struct ReportExporter {
    output_dir: PathBuf,
}

impl ReportExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[instrument(skip(self, analysis), fields(dir = %self.output_dir.display()))]
    pub fn export_all(&self, analysis: &Analysis) -> Result<ExportedFiles, AnalyticsError> {
        fs::create_dir_all(&self.output_dir)?;

        let sales: Vec<SalesRow> = analysis.dataset.sales.iter().map(SalesRow::from).collect();
        let suppliers: Vec<SupplierRow> = analysis
            .dataset
            .suppliers
            .iter()
            .map(SupplierRow::from)
            .collect();

        let files = ExportedFiles {
            inventory: self.write_csv(INVENTORY_FILE, &analysis.inventory)?,
            sales: self.write_csv(SALES_FILE, &sales)?,
            suppliers: self.write_csv(SUPPLIER_FILE, &suppliers)?,
            scorecard: self.write_csv(SCORECARD_FILE, &analysis.scorecards)?,
            summary: self.write_json(SUMMARY_FILE, &analysis.report)?,
        };

        info!(files = files.all().len(), "Reports exported");
        Ok(files)
    }

    /// Writes `rows` to `name` inside the output directory.
    pub fn write_csv<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<PathBuf, AnalyticsError> {
        let path = self.output_dir.join(name);
        let mut writer = csv::Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!(path = %path.display(), rows = rows.len(), "CSV written");
        Ok(path)
    }

    pub fn write_json(&self, name: &str, report: &KpiReport) -> Result<PathBuf, AnalyticsError> {
        let path = self.output_dir.join(name);
        let mut body = serde_json::to_string_pretty(report)?;
        body.push('\n');
        fs::write(&path, body)?;
        debug!(path = %path.display(), "JSON written");
        Ok(path)
    }
}
