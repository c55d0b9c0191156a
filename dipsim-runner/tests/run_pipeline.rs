//! End-to-end tests: config file → data file → report → artifacts.
//!
//! Every test writes its inputs into a fresh tempdir.

use std::path::Path;

use dipsim_core::{simulate, FundDay, SimulationConfig};
use dipsim_runner::config::RunConfig;
use dipsim_runner::export::{load_artifacts, save_artifacts, write_fund_csv};
use dipsim_runner::runner::{run_simulation, RunError};
use dipsim_runner::sweep::{ParamGrid, ParamSweep};
use dipsim_runner::synthetic::{synthetic_series, SyntheticConfig};

const FUND_CSV: &str = "\
date,daily_growth,net_value
2024-01-02,-2.00,0.9800
2024-01-03,-1.00,0.9702
2024-01-04,0.00,0.9702
2024-01-05,8.00,1.0478
2024-01-08,-3.00,1.0164
2024-01-09,1.50,1.0316
";

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn config_file_drives_full_run() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "fund.csv", FUND_CSV);
    write(
        tmp.path(),
        "run.toml",
        "[simulation]\nsell_ratio_percent = 50.0\n\n[data]\npath = \"fund.csv\"\nfund_code = \"161725\"\n",
    );

    let config = RunConfig::from_file(&tmp.path().join("run.toml")).unwrap();
    let report = run_simulation(&config).unwrap();

    assert_eq!(report.fund_code, "161725");
    assert_eq!(report.day_count, 6);
    assert_eq!(report.start_date, "2024-01-02");
    assert_eq!(report.end_date, "2024-01-09");
    assert_eq!(report.result.buy_count, 3);
    assert_eq!(report.result.sell_count, 1);
    assert_eq!(report.result.daily_results.len(), 6);
}

#[test]
fn date_window_limits_replay() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "fund.csv", FUND_CSV);
    let mut config = RunConfig::for_data(tmp.path().join("fund.csv"));
    config.data.start_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 3);
    config.data.end_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 5);

    let report = run_simulation(&config).unwrap();
    assert_eq!(report.day_count, 3);
    assert_eq!(report.start_date, "2024-01-03");
    assert_eq!(report.end_date, "2024-01-05");
    // No embedded or configured code: the file stem names the fund.
    assert_eq!(report.fund_code, "fund");
}

#[test]
fn json_envelope_supplies_fund_code() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "api.json",
        r#"{"success": true, "data": {"fund_code": "000001", "list": [
            {"date": "2024-01-03", "daily_growth": 2.0, "net_value": 1.0},
            {"date": "2024-01-02", "daily_growth": -2.0, "net_value": 0.98}
        ]}}"#,
    );
    let config = RunConfig::for_data(tmp.path().join("api.json"));
    let report = run_simulation(&config).unwrap();
    assert_eq!(report.fund_code, "000001");
    assert_eq!(report.start_date, "2024-01-02");
    assert_eq!(report.result.buy_count, 1);
}

#[test]
fn loaded_file_matches_in_memory_replay() {
    let tmp = tempfile::tempdir().unwrap();
    let days = synthetic_series(&SyntheticConfig {
        days: 120,
        seed: 11,
        ..Default::default()
    });
    let path = tmp.path().join("synth.csv");
    write_fund_csv(&days, &path).unwrap();

    let report = run_simulation(&RunConfig::for_data(&path)).unwrap();
    let direct = simulate(&SimulationConfig::default(), &days).unwrap();
    assert_eq!(report.result, direct);
}

#[test]
fn missing_data_file_is_data_error() {
    let tmp = tempfile::tempdir().unwrap();
    let config = RunConfig::for_data(tmp.path().join("absent.csv"));
    assert!(matches!(run_simulation(&config), Err(RunError::Data(_))));
}

#[test]
fn artifacts_reload_identically() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "fund.csv", FUND_CSV);
    let report = run_simulation(&RunConfig::for_data(tmp.path().join("fund.csv"))).unwrap();

    let out = tmp.path().join("out");
    let dir = save_artifacts(&report, &out).unwrap();
    assert_eq!(load_artifacts(&dir).unwrap(), report);

    let trades = std::fs::read_to_string(dir.join("trades.csv")).unwrap();
    assert_eq!(trades.lines().count(), 1 + report.result.trade_log.len());

    // Same run, same directory.
    assert_eq!(save_artifacts(&report, &out).unwrap(), dir);
}

#[test]
fn hostile_fund_code_saves_under_output_dir() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "api.json",
        r#"{"success": true, "data": {"fund_code": "../../escaped", "list": [
            {"date": "2024-01-02", "daily_growth": -2.0, "net_value": 0.98}
        ]}}"#,
    );
    let report = run_simulation(&RunConfig::for_data(tmp.path().join("api.json"))).unwrap();
    assert_eq!(report.fund_code, "../../escaped");

    let out = tmp.path().join("a").join("b");
    let dir = save_artifacts(&report, &out).unwrap();
    assert!(dir.starts_with(&out));
    assert!(!tmp.path().join("escaped").exists());
}

#[test]
fn sweep_over_loaded_series() {
    let days: Vec<FundDay> = synthetic_series(&SyntheticConfig {
        days: 200,
        seed: 3,
        ..Default::default()
    });
    let grid = ParamGrid {
        sell_gain_thresholds: vec![2.0, 5.0],
        sell_ratios: vec![50.0, 100.0],
        rounding_modes: vec![true, false],
        ..Default::default()
    };
    let results = ParamSweep::new()
        .sweep(&grid, &SimulationConfig::default(), &days, "synthetic")
        .unwrap();
    assert_eq!(results.len(), 8);
    let best = results.best().unwrap();
    assert!(results
        .all()
        .iter()
        .all(|r| r.return_percent() <= best.return_percent()));
}
