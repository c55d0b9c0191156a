//! One record of the input series.

use serde::{Deserialize, Serialize};

/// One trading day of a fund's history.
///
/// `net_value` is carried for display only. The engine compounds
/// `daily_growth` into its own price index, so a rebased NAV in the source
/// data never produces a jump in the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundDay {
    pub date: String,
    /// Daily change in percent (e.g. `-1.25` for a 1.25% drop).
    pub daily_growth: f64,
    #[serde(default)]
    pub net_value: f64,
}

impl FundDay {
    pub fn new(date: impl Into<String>, daily_growth: f64) -> Self {
        Self {
            date: date.into(),
            daily_growth,
            net_value: 0.0,
        }
    }

    pub fn with_net_value(mut self, net_value: f64) -> Self {
        self.net_value = net_value;
        self
    }
}
