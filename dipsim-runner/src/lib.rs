//! DipSim Runner — run orchestration around `dipsim-core`.
//!
//! This crate provides:
//! - TOML run configuration
//! - Fund data loading from CSV or JSON, with date windows
//! - Single-run reports with config/dataset fingerprints
//! - JSON and CSV artifact export
//! - Parallel parameter sweeps
//! - Seeded synthetic series

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod sweep;
pub mod synthetic;

pub use config::{ConfigError, DataConfig, RunConfig};
pub use data_loader::{filter_date_range, load_fund_data, parse_date, LoadError, LoadedData};
pub use export::{export_json, import_json, load_artifacts, save_artifacts, write_fund_csv};
pub use runner::{run_from_data, run_simulation, RunError, SimulationReport, SCHEMA_VERSION};
pub use sweep::{ParamGrid, ParamSweep, SweepResults};
pub use synthetic::{synthetic_series, SyntheticConfig};
