//! Daily step: one input record in, one snapshot out.
//!
//! Per day:
//! 1. Clear the day's trade
//! 2. Compound the price index by the day's change
//! 3. Down day with cash left: buy policy
//! 4. Up day with an open position: sell policy
//! 5. Append the snapshot
//!
//! A flat day neither buys nor sells, even when an open position is already
//! above the sell threshold; the sell waits for the next up day.

use crate::domain::{DailySnapshot, FundDay, SimulationConfig};

use super::buy::buy;
use super::result::snapshot;
use super::sell::check_and_sell;
use super::state::EngineState;

/// Apply one day to `state` in place.
///
/// Callers supply days in chronological order; nothing here sorts.
pub fn process_day(state: &mut EngineState, config: &SimulationConfig, day: &FundDay) {
    let change_percent = day.daily_growth;
    state.day_trade = None;

    state.current_price *= 1.0 + change_percent / 100.0;

    if change_percent < 0.0 && state.remaining_capital > 0.0 {
        buy(state, config, change_percent.abs(), &day.date);
    }

    if change_percent > 0.0 && state.has_position() {
        check_and_sell(state, config, &day.date);
    }

    state.verify_cash();

    let snap = snapshot(state, change_percent, &day.date);
    if snap.holding_value > state.max_holding_value {
        state.max_holding_value = snap.holding_value;
    }
    state.daily_results.push(snap);
}

/// Pure form of [`process_day`]: consumes the previous state, returns the next.
pub fn step(mut state: EngineState, config: &SimulationConfig, day: &FundDay) -> EngineState {
    process_day(&mut state, config, day);
    state
}

/// Last snapshot produced, if any day has been processed.
pub fn last_snapshot(state: &EngineState) -> Option<&DailySnapshot> {
    state.daily_results.last()
}
