//! Run orchestration: config → data → engine → report.
//!
//! Two entry points:
//! - `run_simulation()`: loads the series named by a `RunConfig`. Used by the CLI.
//! - `run_from_data()`: takes a pre-loaded series, no I/O. Used by sweeps.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use dipsim_core::fingerprint::{config_fingerprint, dataset_hash, run_id, Fingerprint};
use dipsim_core::{FinalResult, FundDay, SimError, SimulationConfig};

use crate::config::{ConfigError, RunConfig};
use crate::data_loader::{filter_date_range, load_fund_data, LoadError, LoadedData};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("simulation error: {0}")]
    Simulation(#[from] SimError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// A `FinalResult` plus everything needed to identify and reproduce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: Fingerprint,
    pub config_fingerprint: Fingerprint,
    pub dataset_hash: Fingerprint,
    pub fund_code: String,
    /// First and last replayed dates; empty when the series was empty.
    pub start_date: String,
    pub end_date: String,
    pub day_count: usize,
    pub config: SimulationConfig,
    pub result: FinalResult,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl SimulationReport {
    pub fn return_percent(&self) -> f64 {
        self.result.return_percent
    }
}

/// Load the configured series, apply the date window and replay it.
pub fn run_simulation(config: &RunConfig) -> Result<SimulationReport, RunError> {
    config.validate()?;
    let LoadedData {
        days,
        fund_code: embedded_code,
    } = load_fund_data(&config.data.path)?;
    let loaded = days.len();
    let days = filter_date_range(days, config.data.start_date, config.data.end_date);
    info!(
        path = %config.data.path.display(),
        loaded,
        in_window = days.len(),
        "fund data ready"
    );
    let fund_code = config
        .data
        .fund_code
        .clone()
        .or(embedded_code)
        .unwrap_or_else(|| config.fund_label());
    run_from_data(&config.simulation, &days, &fund_code)
}

/// Replay pre-loaded data. No I/O.
pub fn run_from_data(
    config: &SimulationConfig,
    data: &[FundDay],
    fund_code: &str,
) -> Result<SimulationReport, RunError> {
    let result = dipsim_core::simulate(config, data)?;
    let report = SimulationReport {
        schema_version: SCHEMA_VERSION,
        run_id: run_id(config, data),
        config_fingerprint: config_fingerprint(config),
        dataset_hash: dataset_hash(data),
        fund_code: fund_code.to_string(),
        start_date: data.first().map(|d| d.date.clone()).unwrap_or_default(),
        end_date: data.last().map(|d| d.date.clone()).unwrap_or_default(),
        day_count: data.len(),
        config: config.clone(),
        result,
    };
    info!(
        run_id = report.run_id.short(12),
        fund = %report.fund_code,
        days = report.day_count,
        buys = report.result.buy_count,
        sells = report.result.sell_count,
        return_percent = report.result.return_percent,
        "simulation complete"
    );
    Ok(report)
}
