use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use serde::Serialize;
use tracing::{error, info};

use supply_chain_analytics::{self as analytics, config, AnalyticsError, AppConfig};

/// Synthetic supply chain analytics: CSV exports, KPI summary and dashboard
#[derive(Parser)]
#[command(name = "supply-chain-analytics", version, about)]
struct Cli {
    /// Directory holding default.toml and per-environment overrides
    #[arg(long, value_name = "DIR", default_value = config::CONFIG_DIR)]
    config_dir: PathBuf,

    /// Seed for the synthetic data stream
    #[arg(long)]
    seed: Option<u64>,

    /// Directory receiving all outputs
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Write tables and summary only
    #[arg(long, action = ArgAction::SetTrue)]
    skip_dashboard: bool,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Print the KPI summary as pretty JSON on stdout"
    )]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<AnalyticsError>()
                .map(AnalyticsError::exit_code)
                .unwrap_or(1);
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::from(code)
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let mut cfg = config::load_config_from(&cli.config_dir)
        .map_err(AnalyticsError::from)
        .context("failed to load application config")?;

    apply_overrides(&mut cfg, &cli);

    config::init_tracing(cfg.log_level(), cfg.log_json);
    info!(environment = %cfg.environment, seed = cfg.seed, "Starting supply chain analysis");

    let outcome = analytics::run(&cfg).context("analysis run failed")?;

    for path in outcome.files.all() {
        info!(path = %path.display(), "Exported");
    }
    if let Some(path) = &outcome.dashboard {
        info!(path = %path.display(), "Dashboard saved");
    }

    if cli.json {
        print_json(&outcome.report)?;
    }
    Ok(())
}

/// Command-line flags win over file and environment configuration.
fn apply_overrides(cfg: &mut AppConfig, cli: &Cli) {
    if let Some(seed) = cli.seed {
        cfg.seed = seed;
    }
    if let Some(dir) = &cli.output_dir {
        cfg.output_dir = dir.clone();
    }
    if cli.skip_dashboard {
        cfg.render_dashboard = false;
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AppConfig {
        AppConfig::new(42, "output".into(), "test".into())
    }

    #[test]
    fn no_flags_keep_configured_values() {
        let cli = Cli::try_parse_from(["supply-chain-analytics"]).unwrap();
        let mut cfg = base();
        apply_overrides(&mut cfg, &cli);

        assert_eq!(cli.config_dir, PathBuf::from(config::CONFIG_DIR));
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.output_dir, "output");
        assert!(cfg.render_dashboard);
        assert!(!cli.json);
    }

    #[test]
    fn flags_override_configuration() {
        let cli = Cli::try_parse_from([
            "supply-chain-analytics",
            "--seed",
            "7",
            "--output-dir",
            "elsewhere",
            "--skip-dashboard",
            "--json",
        ])
        .unwrap();
        let mut cfg = base();
        apply_overrides(&mut cfg, &cli);

        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.output_dir, "elsewhere");
        assert!(!cfg.render_dashboard);
        assert!(cli.json);
    }

    #[test]
    fn rejects_non_numeric_seed() {
        assert!(Cli::try_parse_from(["supply-chain-analytics", "--seed", "abc"]).is_err());
    }
}
