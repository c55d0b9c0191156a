//! Simulation parameters.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Parameters for one replay. Immutable for the duration of a run.
///
/// Field aliases accept the camelCase names used by the browser form so that
/// saved parameter sets from there deserialize unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Starting cash.
    #[serde(alias = "totalCapital")]
    pub total_capital: f64,
    /// Currency bought per unit of drop.
    #[serde(alias = "buyAmountPerUnit", alias = "buyAmountPerPoint")]
    pub buy_amount_per_unit: f64,
    /// Drop percentage that makes up one unit.
    #[serde(alias = "minBuyDropPercent")]
    pub min_buy_drop_percent: f64,
    /// Round the unit count to nearest (true) or floor it (false).
    #[serde(alias = "useRounding")]
    pub use_rounding: bool,
    /// Gain over average cost, in percent, above which a sell fires.
    #[serde(alias = "sellGainThresholdPercent", alias = "sellThreshold")]
    pub sell_gain_threshold_percent: f64,
    /// Share of the open position liquidated per sell, in percent.
    #[serde(alias = "sellRatioPercent", alias = "sellRatio")]
    pub sell_ratio_percent: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_capital: 100_000.0,
            buy_amount_per_unit: 1_000.0,
            min_buy_drop_percent: 1.0,
            use_rounding: true,
            sell_gain_threshold_percent: 5.0,
            sell_ratio_percent: 50.0,
        }
    }
}

impl SimulationConfig {
    /// Reject parameter sets that would produce NaN/Infinity or nonsense.
    pub fn validate(&self) -> Result<(), SimError> {
        positive("total_capital", self.total_capital)?;
        positive("buy_amount_per_unit", self.buy_amount_per_unit)?;
        positive("min_buy_drop_percent", self.min_buy_drop_percent)?;

        if !self.sell_gain_threshold_percent.is_finite() {
            return Err(SimError::invalid(
                "sell_gain_threshold_percent",
                format!("must be finite, got {}", self.sell_gain_threshold_percent),
            ));
        }

        let ratio = self.sell_ratio_percent;
        if !ratio.is_finite() || ratio <= 0.0 || ratio > 100.0 {
            return Err(SimError::invalid(
                "sell_ratio_percent",
                format!("must be in (0, 100], got {ratio}"),
            ));
        }

        Ok(())
    }

    /// Fraction of the position kept after a partial sell.
    pub fn keep_fraction(&self) -> f64 {
        1.0 - self.sell_ratio_percent / 100.0
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(field, format!("must be > 0, got {value}")))
    }
}
