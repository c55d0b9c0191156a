//! Trade log entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One executed trade. A day produces at most one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeEvent {
    Buy {
        date: String,
        price: f64,
        amount: f64,
        shares: f64,
        /// Number of drop units that sized this buy (whole-valued).
        units: f64,
        drop_percent: f64,
        /// Cash left after the buy.
        remaining_capital: f64,
    },
    SellPartial {
        date: String,
        price: f64,
        shares: f64,
        amount: f64,
        /// Proceeds minus the pro-rata cost basis removed.
        profit: f64,
        sell_ratio_percent: f64,
        avg_buy_price: f64,
        sell_price: f64,
    },
}

impl TradeEvent {
    pub fn date(&self) -> &str {
        match self {
            Self::Buy { date, .. } | Self::SellPartial { date, .. } => date,
        }
    }

    /// Cash moved by the trade: spent on a buy, received on a sell.
    pub fn amount(&self) -> f64 {
        match self {
            Self::Buy { amount, .. } | Self::SellPartial { amount, .. } => *amount,
        }
    }

    pub fn shares(&self) -> f64 {
        match self {
            Self::Buy { shares, .. } | Self::SellPartial { shares, .. } => *shares,
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Self::Buy { .. })
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Self::SellPartial { .. })
    }

    /// Realized profit; zero for buys.
    pub fn profit(&self) -> f64 {
        match self {
            Self::Buy { .. } => 0.0,
            Self::SellPartial { profit, .. } => *profit,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Buy { .. } => "BUY",
            Self::SellPartial { .. } => "SELL_PARTIAL",
        }
    }
}

/// Short human-readable description, e.g. `Buy 2 units (2000)` or
/// `Sell 50% (5250, profit 250)`.
impl fmt::Display for TradeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy { units, amount, .. } => {
                write!(f, "Buy {units} units ({amount:.0})")
            }
            Self::SellPartial {
                sell_ratio_percent,
                amount,
                profit,
                ..
            } => {
                let outcome = if *profit >= 0.0 { "profit" } else { "loss" };
                write!(
                    f,
                    "Sell {sell_ratio_percent}% ({amount:.0}, {outcome} {:.0})",
                    profit.abs()
                )
            }
        }
    }
}
