use std::path::Path;

use supply_chain_analytics::config::AppConfig;
use tempfile::TempDir;

/// Helper harness: a configuration writing into its own temporary directory.
pub struct TestRun {
    pub dir: TempDir,
    pub config: AppConfig,
}

impl TestRun {
    pub fn new(seed: u64) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::new(
            seed,
            dir.path().join("output").display().to_string(),
            "test".into(),
        );
        config.sku_count = 40;
        config.dashboard_width = 900;
        config.dashboard_height = 720;
        Self { dir, config }
    }

    pub fn without_dashboard(mut self) -> Self {
        self.config.render_dashboard = false;
        self
    }

    pub fn output(&self) -> &Path {
        Path::new(&self.config.output_dir)
    }

    #[allow(dead_code)]
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.output().join(name)).expect("output file")
    }
}
