//! Per-day output of the replay.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::trade::TradeEvent;

/// State of the simulation at the close of one input day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: String,
    pub change_percent: f64,
    /// Price index change since day 0, in percent.
    pub cumulative_change_percent: f64,
    /// Gain of the price index over average lot cost; 0 when flat.
    pub current_gain_percent: f64,
    pub holding_value: f64,
    pub holding_breakdown: HoldingBreakdown,
    pub total_assets: f64,
    /// Trade executed on this day, if any.
    pub trade: Option<TradeEvent>,
    /// Display text for `trade`; empty when there was none.
    pub trade_info: String,
    pub current_price: f64,
    pub remaining_capital: f64,
}

impl DailySnapshot {
    pub fn bought(&self) -> bool {
        self.trade.as_ref().is_some_and(TradeEvent::is_buy)
    }

    pub fn sold(&self) -> bool {
        self.trade.as_ref().is_some_and(TradeEvent::is_sell)
    }
}

/// How today's holding value came about: yesterday's value, plus the move
/// from today's price change, plus whatever was bought, minus whatever was
/// sold.
///
/// Display only. Nothing in the engine reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HoldingBreakdown {
    pub previous_holding_value: f64,
    pub price_gain_loss: f64,
    pub bought: f64,
    pub sold: f64,
    pub holding_value: f64,
}

impl HoldingBreakdown {
    /// Build today's breakdown from yesterday's holding value and today's trade.
    pub fn new(
        previous_holding_value: f64,
        change_percent: f64,
        trade: Option<&TradeEvent>,
        holding_value: f64,
    ) -> Self {
        let price_gain_loss = if previous_holding_value > 0.0 && change_percent != 0.0 {
            previous_holding_value * change_percent / 100.0
        } else {
            0.0
        };
        let (bought, sold) = match trade {
            Some(t) if t.is_buy() => (t.amount(), 0.0),
            Some(t) => (0.0, t.amount()),
            None => (0.0, 0.0),
        };
        Self {
            previous_holding_value,
            price_gain_loss,
            bought,
            sold,
            holding_value,
        }
    }

    /// Nothing held and nothing traded.
    pub fn is_empty(&self) -> bool {
        self.holding_value <= 0.0 && self.bought <= 0.0 && self.sold <= 0.0
    }
}

/// Renders e.g. `(base 12000 - loss 240 + buy 2000)`; empty when
/// [`HoldingBreakdown::is_empty`].
impl fmt::Display for HoldingBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "(base {:.0}", self.previous_holding_value)?;
        if self.price_gain_loss > 0.0 {
            write!(f, " + gain {:.0}", self.price_gain_loss)?;
        } else if self.price_gain_loss < 0.0 {
            write!(f, " - loss {:.0}", self.price_gain_loss.abs())?;
        }
        if self.bought > 0.0 {
            write!(f, " + buy {:.0}", self.bought)?;
        }
        if self.sold > 0.0 {
            write!(f, " - sell {:.0}", self.sold)?;
        }
        f.write_str(")")
    }
}
