mod common;

use assert_matches::assert_matches;
use common::TestRun;
use rust_decimal::Decimal;
use supply_chain_analytics::{
    reports::export::{INVENTORY_FILE, SALES_FILE, SCORECARD_FILE, SUMMARY_FILE, SUPPLIER_FILE},
    run, AnalyticsError,
};

const CSV_FILES: [&str; 4] = [INVENTORY_FILE, SALES_FILE, SUPPLIER_FILE, SCORECARD_FILE];

#[test]
fn run_writes_every_output() {
    let t = TestRun::new(42);
    let outcome = run(&t.config).unwrap();

    for path in outcome.files.all() {
        assert!(path.exists(), "missing {}", path.display());
    }
    let dashboard = outcome.dashboard.expect("dashboard path");
    assert!(dashboard.exists());
    assert!(std::fs::metadata(&dashboard).unwrap().len() > 0);
}

#[test]
fn csv_tables_have_expected_shape() {
    let t = TestRun::new(7).without_dashboard();
    run(&t.config).unwrap();

    let inventory = t.read(INVENTORY_FILE);
    assert!(inventory.starts_with("SKU,Category,Supplier,Opening_Stock,Current_Stock"));
    assert_eq!(inventory.lines().count(), 41);

    let sales = t.read(SALES_FILE);
    assert!(sales.starts_with("Date,Category,Units_Sold,Revenue,Month,Quarter"));
    assert_eq!(sales.lines().count(), 366 * 5 + 1);

    let suppliers = t.read(SUPPLIER_FILE);
    assert_eq!(suppliers.lines().count(), 5 * 12 + 1);

    let scorecard = t.read(SCORECARD_FILE);
    let lines: Vec<&str> = scorecard.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[1].starts_with("SupplierA,"));
    assert!(lines[5].starts_with("SupplierE,"));
}

#[test]
fn same_seed_gives_identical_exports() {
    let a = TestRun::new(1234).without_dashboard();
    let b = TestRun::new(1234).without_dashboard();
    run(&a.config).unwrap();
    run(&b.config).unwrap();

    for name in CSV_FILES.iter().chain(std::iter::once(&SUMMARY_FILE)) {
        assert_eq!(a.read(name), b.read(name), "{} differs", name);
    }
}

#[test]
fn different_seeds_differ() {
    let a = TestRun::new(1).without_dashboard();
    let b = TestRun::new(2).without_dashboard();
    run(&a.config).unwrap();
    run(&b.config).unwrap();
    assert_ne!(a.read(INVENTORY_FILE), b.read(INVENTORY_FILE));
}

#[test]
fn rerun_overwrites_previous_outputs() {
    let t = TestRun::new(5).without_dashboard();
    run(&t.config).unwrap();
    let first = t.read(SALES_FILE);
    run(&t.config).unwrap();
    assert_eq!(first, t.read(SALES_FILE));
}

#[test]
fn summary_json_matches_sales_table() {
    let t = TestRun::new(99).without_dashboard();
    let outcome = run(&t.config).unwrap();

    let summary: serde_json::Value = serde_json::from_str(&t.read(SUMMARY_FILE)).unwrap();
    assert_eq!(summary["seed"], 99);
    assert_eq!(summary["scorecards"].as_array().unwrap().len(), 5);

    let mut reader = csv::Reader::from_path(t.output().join(SALES_FILE)).unwrap();
    let revenue_idx = reader
        .headers()
        .unwrap()
        .iter()
        .position(|h| h == "Revenue")
        .unwrap();
    let total: Decimal = reader
        .records()
        .map(|r| r.unwrap()[revenue_idx].parse::<Decimal>().unwrap())
        .sum();
    assert_eq!(total, outcome.report.sales.total_revenue);
}

#[test]
fn invalid_config_is_rejected_before_any_output() {
    let mut t = TestRun::new(3);
    t.config.reorder_days = 2.0;
    let err = run(&t.config).unwrap_err();
    assert_matches!(err, AnalyticsError::ValidationError(_));
    assert_eq!(err.exit_code(), 2);
    assert!(!t.output().exists());
}

#[test]
fn fixed_movement_strategy_runs() {
    let mut t = TestRun::new(11).without_dashboard();
    t.config.movement_strategy = "fixed".into();
    let outcome = run(&t.config).unwrap();
    let movement = &outcome.report.inventory.movement_by_category;
    let classified: usize = movement.values().map(|m| m.fast + m.medium + m.slow).sum();
    assert_eq!(classified, 40);
}
