//! Mutable simulation state.

use crate::domain::{DailySnapshot, Lot, LotTotals, SimulationConfig, TradeEvent};

/// Everything that evolves day by day during a replay.
///
/// Built fresh for every run; no field survives from one `simulate` call to
/// the next.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    /// Cash not yet invested. Never negative.
    pub remaining_capital: f64,
    /// Synthetic price index, 1.0 on day 0.
    pub current_price: f64,
    pub positions: Vec<Lot>,
    /// Cost basis of the open lots, reduced pro-rata on partial sells.
    pub total_invested: f64,
    pub trade_log: Vec<TradeEvent>,
    /// Running maximum of the holding value.
    pub max_holding_value: f64,
    pub daily_results: Vec<DailySnapshot>,
    /// Trade executed during the day currently being processed.
    pub day_trade: Option<TradeEvent>,
}

impl EngineState {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            remaining_capital: config.total_capital,
            current_price: 1.0,
            positions: Vec::new(),
            total_invested: 0.0,
            trade_log: Vec::new(),
            max_holding_value: 0.0,
            daily_results: Vec::new(),
            day_trade: None,
        }
    }

    pub fn totals(&self) -> LotTotals {
        LotTotals::of(&self.positions)
    }

    pub fn total_shares(&self) -> f64 {
        self.totals().shares
    }

    /// Market value of the open lots at the current price index.
    pub fn holding_value(&self) -> f64 {
        self.total_shares() * self.current_price
    }

    pub fn total_assets(&self) -> f64 {
        self.remaining_capital + self.holding_value()
    }

    pub fn current_gain_percent(&self) -> f64 {
        self.totals().gain_percent(self.current_price)
    }

    pub fn has_position(&self) -> bool {
        !self.positions.is_empty()
    }

    /// Holding value recorded for the previous day, 0 before the first.
    pub fn previous_holding_value(&self) -> f64 {
        self.daily_results
            .last()
            .map(|s| s.holding_value)
            .unwrap_or(0.0)
    }

    /// Record a trade for the current day and append it to the log.
    pub(crate) fn record_trade(&mut self, event: TradeEvent) {
        debug_assert!(
            self.day_trade.is_none(),
            "second trade on {}: {event}",
            event.date()
        );
        self.trade_log.push(event.clone());
        self.day_trade = Some(event);
    }

    /// Verify the cash identity: cash never goes negative.
    ///
    /// Panics in debug builds if violated.
    pub fn verify_cash(&self) {
        #[cfg(debug_assertions)]
        {
            assert!(
                self.remaining_capital >= -1e-9,
                "cash went negative: {}",
                self.remaining_capital
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state() {
        let config = SimulationConfig::default();
        let state = EngineState::new(&config);
        assert_eq!(state.remaining_capital, 100_000.0);
        assert_eq!(state.current_price, 1.0);
        assert!(state.positions.is_empty());
        assert!(state.trade_log.is_empty());
        assert_eq!(state.holding_value(), 0.0);
        assert_eq!(state.total_assets(), 100_000.0);
        assert_eq!(state.previous_holding_value(), 0.0);
        assert!(!state.has_position());
    }

    #[test]
    fn holding_value_uses_current_price() {
        let config = SimulationConfig::default();
        let mut state = EngineState::new(&config);
        state.positions.push(Lot::open(1.0, 1000.0));
        assert!(state.has_position());
        state.current_price = 1.1;
        assert!((state.holding_value() - 1100.0).abs() < 1e-9);
        assert!((state.current_gain_percent() - 10.0).abs() < 1e-9);
    }
}
