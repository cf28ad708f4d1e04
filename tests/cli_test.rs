use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const SMALL_RUN: &str = r#"
sku_count = 25
dashboard_width = 600
dashboard_height = 480
"#;

fn config_dir(contents: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("default.toml"), contents).expect("default.toml");
    dir
}

fn run(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_supply-chain-analytics"))
        .env("RUN_ENV", "test")
        .env_remove("APP_ENV")
        .arg("--config-dir")
        .arg(config)
        .args(args)
        .output()
        .expect("run binary")
}

#[test]
fn json_flag_prints_summary_on_stdout() {
    let config = config_dir(SMALL_RUN);
    let out = config.path().join("out");
    let output = run(
        config.path(),
        &[
            "--seed",
            "9",
            "--output-dir",
            out.to_str().expect("utf-8 path"),
            "--skip-dashboard",
            "--json",
        ],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(summary["seed"], 9);
    assert_eq!(summary["inventory"]["sku_count"], 25);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("kpi_summary.json")).unwrap()).unwrap();
    assert_eq!(written, summary);
    assert!(!out.join("supply_chain_dashboard.png").exists());
}

#[test]
fn without_json_flag_stdout_stays_empty() {
    let config = config_dir(SMALL_RUN);
    let out = config.path().join("out");
    let output = run(
        config.path(),
        &["--output-dir", out.to_str().expect("utf-8 path"), "--skip-dashboard"],
    );

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(out.join("inventory_data.csv").exists());
}

#[test]
fn invalid_configuration_exits_with_code_2() {
    let config = config_dir("critical_days = -1.0\n");
    let output = run(config.path(), &["--skip-dashboard"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn unknown_configuration_key_exits_with_code_2() {
    let config = config_dir("sku_cuont = 10\n");
    let output = run(config.path(), &["--skip-dashboard"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unwritable_output_exits_with_code_4() {
    let config = config_dir(SMALL_RUN);
    let blocker = config.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();

    let output = run(
        config.path(),
        &["--output-dir", blocker.to_str().expect("utf-8 path"), "--skip-dashboard"],
    );

    assert_eq!(output.status.code(), Some(4));
}
