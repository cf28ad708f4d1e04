use std::path::PathBuf;
use tracing::{info, instrument};

use crate::{
    config::AppConfig,
    errors::AnalyticsError,
    models::{InventoryRow, SupplierScorecard, SyntheticDataset},
    reports::{
        dashboard::{DashboardRenderer, DashboardSize},
        export::{ExportedFiles, ReportExporter},
        summary, KpiReport,
    },
    services::{
        kpi::KpiCalculator,
        supplier_scorer::SupplierScorer,
        synthesizer::{DataSynthesizer, SynthesisSettings},
    },
};

/// Computed tables and KPIs for one dataset, before anything is written.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub dataset: SyntheticDataset,
    pub inventory: Vec<InventoryRow>,
    pub scorecards: Vec<SupplierScorecard>,
    pub report: KpiReport,
}

/// What a full run produced
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: KpiReport,
    pub files: ExportedFiles,
    /// `None` when dashboard rendering is switched off
    pub dashboard: Option<PathBuf>,
}

/// Runs the whole pipeline: synthesize, derive KPIs, score suppliers,
/// export tables and render the dashboard.
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    config: AppConfig,
    kpi: KpiCalculator,
    scorer: SupplierScorer,
}

impl AnalyticsService {
    pub fn new(config: AppConfig) -> Result<Self, AnalyticsError> {
        let kpi = KpiCalculator::from_config(&config)?;
        let scorer = SupplierScorer::new(config.scoring.clone());
        Ok(Self {
            config,
            kpi,
            scorer,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Generates a fresh dataset from the configured seed.
    pub fn synthesize(&self) -> Result<SyntheticDataset, AnalyticsError> {
        let mut synthesizer = DataSynthesizer::new(SynthesisSettings::from(&self.config))?;
        Ok(synthesizer.generate())
    }

    /// Derives every KPI from an existing dataset.
    #[instrument(skip(self, dataset))]
    pub fn analyze(&self, dataset: SyntheticDataset) -> Result<Analysis, AnalyticsError> {
        let inventory = self.kpi.assess_inventory(&dataset.inventory);
        let inventory_kpis = self.kpi.inventory_kpis(&inventory);
        let sales = self.kpi.aggregate_revenue(&dataset.sales)?;
        let scorecards = self.scorer.scorecards(&dataset.suppliers);

        let report = KpiReport {
            seed: self.config.seed,
            thresholds: *self.kpi.thresholds(),
            inventory: inventory_kpis,
            sales,
            scorecards: scorecards.clone(),
        };

        Ok(Analysis {
            dataset,
            inventory,
            scorecards,
            report,
        })
    }

    #[instrument(skip(self), fields(seed = self.config.seed, output = %self.config.output_dir))]
    pub fn run(&self) -> Result<AnalysisOutcome, AnalyticsError> {
        info!("Generating synthetic supply chain data");
        let analysis = self.analyze(self.synthesize()?)?;

        let exporter = ReportExporter::new(self.config.output_path());
        let files = exporter.export_all(&analysis)?;

        let dashboard = if self.config.render_dashboard {
            let path = self.config.dashboard_path();
            DashboardRenderer::new(DashboardSize {
                width: self.config.dashboard_width,
                height: self.config.dashboard_height,
            })
            .render(&analysis, &path)?;
            info!(path = %path.display(), "Dashboard rendered");
            Some(path)
        } else {
            info!("Dashboard rendering skipped");
            None
        };

        summary::log_summary(&analysis.report);

        Ok(AnalysisOutcome {
            report: analysis.report,
            files,
            dashboard,
        })
    }
}
