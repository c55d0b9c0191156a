//! Result aggregation: per-day snapshots and the end-of-run summary.

use serde::{Deserialize, Serialize};

use crate::domain::{DailySnapshot, HoldingBreakdown, SimulationConfig, TradeEvent};

use super::state::EngineState;

/// Build the snapshot for the day just processed.
pub(crate) fn snapshot(state: &EngineState, change_percent: f64, date: &str) -> DailySnapshot {
    let holding_value = state.holding_value();
    let holding_breakdown = HoldingBreakdown::new(
        state.previous_holding_value(),
        change_percent,
        state.day_trade.as_ref(),
        holding_value,
    );
    let trade_info = state
        .day_trade
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();

    DailySnapshot {
        date: date.to_string(),
        change_percent,
        cumulative_change_percent: price_change_percent(state.current_price),
        current_gain_percent: state.current_gain_percent(),
        holding_value,
        holding_breakdown,
        total_assets: state.remaining_capital + holding_value,
        trade: state.day_trade.clone(),
        trade_info,
        current_price: state.current_price,
        remaining_capital: state.remaining_capital,
    }
}

/// Change of the price index from its starting value of 1.0, in percent.
pub fn price_change_percent(current_price: f64) -> f64 {
    (current_price - 1.0) * 100.0
}

/// Summary of a finished replay plus the full day-by-day trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    /// Price index change over the whole series, in percent.
    pub total_price_change: f64,
    /// Final assets minus starting capital.
    pub total_return: f64,
    /// `total_return` relative to the peak holding value (or to starting
    /// capital if nothing was ever held), in percent.
    pub return_percent: f64,
    /// Sum of realized profit over all partial sells.
    pub total_trade_profit: f64,
    pub buy_count: usize,
    pub sell_count: usize,
    pub max_holding_value: f64,
    pub total_shares: f64,
    pub holding_value: f64,
    pub total_assets: f64,
    pub remaining_capital: f64,
    /// Cost basis still in open lots.
    pub total_invested: f64,
    pub trade_log: Vec<TradeEvent>,
    pub daily_results: Vec<DailySnapshot>,
}

impl FinalResult {
    pub fn day_count(&self) -> usize {
        self.daily_results.len()
    }

    /// Lowest total assets seen on any day; starting capital for an empty run.
    pub fn min_total_assets(&self, initial: f64) -> f64 {
        self.daily_results
            .iter()
            .map(|s| s.total_assets)
            .fold(initial, f64::min)
    }
}

/// Reduce the final state into a [`FinalResult`].
pub fn finalize(state: EngineState, config: &SimulationConfig) -> FinalResult {
    let total_shares = state.total_shares();
    let holding_value = total_shares * state.current_price;
    let total_assets = state.remaining_capital + holding_value;
    let total_return = total_assets - config.total_capital;

    let return_percent = if state.max_holding_value > 0.0 {
        total_return / state.max_holding_value * 100.0
    } else {
        total_return / config.total_capital * 100.0
    };

    let (buy_count, sell_count, total_trade_profit) = state.trade_log.iter().fold(
        (0, 0, 0.0),
        |(buys, sells, profit), event| match event {
            TradeEvent::Buy { .. } => (buys + 1, sells, profit),
            TradeEvent::SellPartial { profit: p, .. } => (buys, sells + 1, profit + p),
        },
    );

    FinalResult {
        total_price_change: price_change_percent(state.current_price),
        total_return,
        return_percent,
        total_trade_profit,
        buy_count,
        sell_count,
        max_holding_value: state.max_holding_value,
        total_shares,
        holding_value,
        total_assets,
        remaining_capital: state.remaining_capital,
        total_invested: state.total_invested,
        trade_log: state.trade_log,
        daily_results: state.daily_results,
    }
}
