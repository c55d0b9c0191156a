//! Day-by-day replay loop: the engine entry point.

use tracing::debug;

use crate::domain::{FundDay, SimulationConfig};
use crate::error::SimError;

use super::result::{finalize, FinalResult};
use super::state::EngineState;
use super::step::process_day;

/// Replay `data` under `config`.
///
/// Validates the config first, then folds every day into a fresh
/// [`EngineState`]. An empty series is not an error: it yields a result with
/// no trades, zero return and no daily rows.
///
/// `daily_growth` values must be finite; NaN or infinity propagates into the
/// price index unchecked.
pub fn simulate(config: &SimulationConfig, data: &[FundDay]) -> Result<FinalResult, SimError> {
    config.validate()?;
    Ok(run(config, data))
}

/// Fold `data` into a fresh state. `config` must already be validated.
fn run(config: &SimulationConfig, data: &[FundDay]) -> FinalResult {
    let mut state = EngineState::new(config);
    state.daily_results.reserve(data.len());
    for day in data {
        process_day(&mut state, config, day);
    }

    debug!(
        days = data.len(),
        trades = state.trade_log.len(),
        final_price = state.current_price,
        "simulation complete"
    );

    finalize(state, config)
}

/// A validated parameter set that can be replayed over any number of series.
///
/// Holds no run state; every [`Simulator::simulate`] call starts from
/// scratch, so a shared `&Simulator` is safe across threads.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn simulate(&self, data: &[FundDay]) -> FinalResult {
        run(&self.config, data)
    }
}
