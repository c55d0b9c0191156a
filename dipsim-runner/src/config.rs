//! TOML run configuration.
//!
//! ```toml
//! [simulation]
//! total_capital = 100000.0
//! buy_amount_per_unit = 1000.0
//! min_buy_drop_percent = 1.0
//! use_rounding = true
//! sell_gain_threshold_percent = 5.0
//! sell_ratio_percent = 50.0
//!
//! [data]
//! path = "fund.csv"
//! fund_code = "161725"
//! start_date = "2024-01-01"   # or "20240101"
//! end_date = "2024-12-31"
//! ```
//!
//! Every `[simulation]` key is optional and falls back to the engine default.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dipsim_core::{SimError, SimulationConfig};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::data_loader::parse_date;

/// Errors from loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Simulation(#[from] SimError),
    #[error("start_date {start} is after end_date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
}

/// Complete configuration of one run: parameters plus where the data lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    pub data: DataConfig,
}

/// Input series location and the optional inclusive date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub fund_code: Option<String>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub end_date: Option<NaiveDate>,
}

impl RunConfig {
    /// Config for a data file with default parameters and no date window.
    pub fn for_data(path: impl Into<PathBuf>) -> Self {
        Self {
            simulation: SimulationConfig::default(),
            data: DataConfig {
                path: path.into(),
                fund_code: None,
                start_date: None,
                end_date: None,
            },
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. A relative `data.path` resolves against the config
    /// file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        if config.data.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.data.path = dir.join(&config.data.path);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        if let (Some(start), Some(end)) = (self.data.start_date, self.data.end_date) {
            if start > end {
                return Err(ConfigError::InvertedDateRange { start, end });
            }
        }
        Ok(())
    }

    /// Label used in reports and artifact directory names.
    pub fn fund_label(&self) -> String {
        self.data.fund_code.clone().unwrap_or_else(|| {
            self.data
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "fund".to_string())
        })
    }
}

fn flexible_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'"))),
    }
}
