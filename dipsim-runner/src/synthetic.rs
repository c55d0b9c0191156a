//! Seeded synthetic fund series for demos and tests.
//!
//! A geometric random walk sampled on weekdays only. Growth is rounded to
//! two decimals the way fund data sources publish it, and `net_value`
//! compounds from 1.0 using the rounded growth so the series is
//! self-consistent.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use dipsim_core::FundDay;

/// Random walk parameters. Drift and volatility are in percent per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub days: usize,
    pub seed: u64,
    pub drift_percent: f64,
    pub volatility_percent: f64,
    pub start_date: NaiveDate,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            days: 250,
            seed: 42,
            drift_percent: 0.02,
            volatility_percent: 1.2,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default(),
        }
    }
}

/// Generate `config.days` trading days. Same config, same series.
pub fn synthetic_series(config: &SyntheticConfig) -> Vec<FundDay> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut date = config.start_date;
    let mut nav = 1.0_f64;
    let mut days = Vec::with_capacity(config.days);

    while days.len() < config.days {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            // Irwin-Hall: twelve uniforms approximate a standard normal.
            let noise: f64 = (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0;
            let growth = config.drift_percent + config.volatility_percent * noise;
            // Clamp so the index can never hit zero.
            let growth = (growth.max(-20.0) * 100.0).round() / 100.0;
            nav *= 1.0 + growth / 100.0;
            days.push(
                FundDay::new(date.format("%Y-%m-%d").to_string(), growth)
                    .with_net_value((nav * 10_000.0).round() / 10_000.0),
            );
        }
        date += Duration::days(1);
    }
    days
}
