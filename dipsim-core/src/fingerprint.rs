//! Run fingerprinting: deterministic identification of parameter sets and
//! input series.
//!
//! - `config_fingerprint`: BLAKE3 over the bit patterns of a `SimulationConfig`.
//! - `dataset_hash`: BLAKE3 over each day's date and the exact bits of its growth.
//! - `run_id`: both of the above combined; equal ids mean identical results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{FundDay, SimulationConfig};

/// Hex-encoded BLAKE3 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    fn from_hash(hash: blake3::Hash) -> Self {
        Self(hash.to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading `n` hex characters, for directory names and log lines.
    pub fn short(&self, n: usize) -> &str {
        &self.0[..n.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint of a parameter set, independent of float formatting.
pub fn config_fingerprint(config: &SimulationConfig) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();
    for value in [
        config.total_capital,
        config.buy_amount_per_unit,
        config.min_buy_drop_percent,
        config.sell_gain_threshold_percent,
        config.sell_ratio_percent,
    ] {
        hasher.update(&value.to_bits().to_le_bytes());
    }
    hasher.update(&[u8::from(config.use_rounding)]);
    Fingerprint::from_hash(hasher.finalize())
}

/// Fingerprint of an input series. `net_value` is excluded since the engine
/// never reads it.
pub fn dataset_hash(data: &[FundDay]) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(data.len() as u64).to_le_bytes());
    for day in data {
        hasher.update(&(day.date.len() as u64).to_le_bytes());
        hasher.update(day.date.as_bytes());
        hasher.update(&day.daily_growth.to_bits().to_le_bytes());
    }
    Fingerprint::from_hash(hasher.finalize())
}

/// Identity of a (config, dataset) pair.
pub fn run_id(config: &SimulationConfig, data: &[FundDay]) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();
    hasher.update(config_fingerprint(config).as_str().as_bytes());
    hasher.update(dataset_hash(data).as_str().as_bytes());
    Fingerprint::from_hash(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Vec<FundDay> {
        vec![
            FundDay::new("2024-01-02", -1.2),
            FundDay::new("2024-01-03", 0.8),
        ]
    }

    #[test]
    fn config_fingerprint_deterministic() {
        let config = SimulationConfig::default();
        assert_eq!(config_fingerprint(&config), config_fingerprint(&config.clone()));
        assert_eq!(config_fingerprint(&config).as_str().len(), 64);
    }

    #[test]
    fn config_fingerprint_changes_with_params() {
        let a = SimulationConfig::default();
        let b = SimulationConfig {
            use_rounding: false,
            ..Default::default()
        };
        let c = SimulationConfig {
            sell_ratio_percent: 49.0,
            ..Default::default()
        };
        assert_ne!(config_fingerprint(&a), config_fingerprint(&b));
        assert_ne!(config_fingerprint(&a), config_fingerprint(&c));
    }

    #[test]
    fn dataset_hash_ignores_net_value() {
        let a = series();
        let mut b = series();
        b[0].net_value = 1.234;
        assert_eq!(dataset_hash(&a), dataset_hash(&b));
        b[1].daily_growth = 0.81;
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
    }

    #[test]
    fn run_id_combines_both() {
        let config = SimulationConfig::default();
        let data = series();
        assert_eq!(run_id(&config, &data), run_id(&config, &data));
        assert_ne!(run_id(&config, &data), run_id(&config, &data[..1]));
        assert_eq!(run_id(&config, &data).short(12).len(), 12);
    }
}
