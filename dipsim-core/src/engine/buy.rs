//! Buy policy: size a purchase from the day's drop.

use tracing::debug;

use crate::domain::{Lot, SimulationConfig, TradeEvent};

use super::state::EngineState;

/// Number of drop units in `drop_percent`, as a whole-valued `f64`.
///
/// Rounding mode uses `f64::round` (half away from zero); since the drop is
/// never negative this is plain round-half-up. The count is unbounded: a tiny
/// `min_buy_drop_percent` can yield more units than any integer type holds.
pub fn unit_count(drop_percent: f64, config: &SimulationConfig) -> f64 {
    let ratio = drop_percent / config.min_buy_drop_percent;
    let units = if config.use_rounding {
        ratio.round()
    } else {
        ratio.floor()
    };
    units.max(0.0)
}

/// Buy into a drop of `drop_percent` at the state's current price.
///
/// Spends `units * buy_amount_per_unit`, capped by the remaining cash. Does
/// nothing when the drop is under one unit or cash is exhausted.
pub fn buy(state: &mut EngineState, config: &SimulationConfig, drop_percent: f64, date: &str) {
    let units = unit_count(drop_percent, config);
    let requested = units * config.buy_amount_per_unit;
    let amount = requested.min(state.remaining_capital);

    if units <= 0.0 || amount <= 0.0 {
        return;
    }

    let lot = Lot::open(state.current_price, amount);
    state.positions.push(lot);
    state.remaining_capital -= amount;
    state.total_invested += amount;

    debug!(
        date,
        units,
        amount,
        price = state.current_price,
        remaining = state.remaining_capital,
        "buy"
    );

    state.record_trade(TradeEvent::Buy {
        date: date.to_string(),
        price: state.current_price,
        amount,
        shares: lot.shares,
        units,
        drop_percent,
        remaining_capital: state.remaining_capital,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(use_rounding: bool) -> SimulationConfig {
        SimulationConfig {
            use_rounding,
            ..Default::default()
        }
    }

    #[test]
    fn floor_vs_round() {
        assert_eq!(unit_count(1.4, &config(false)), 1.0);
        assert_eq!(unit_count(1.4, &config(true)), 1.0);
        assert_eq!(unit_count(1.6, &config(false)), 1.0);
        assert_eq!(unit_count(1.6, &config(true)), 2.0);
    }

    #[test]
    fn half_rounds_up() {
        assert_eq!(unit_count(2.5, &config(true)), 3.0);
        assert_eq!(unit_count(0.5, &config(true)), 1.0);
    }

    #[test]
    fn fractional_unit_size() {
        let config = SimulationConfig {
            min_buy_drop_percent: 0.5,
            use_rounding: false,
            ..Default::default()
        };
        assert_eq!(unit_count(1.74, &config), 3.0);
    }

    #[test]
    fn small_drop_under_floor_is_noop() {
        let config = config(false);
        let mut state = EngineState::new(&config);
        buy(&mut state, &config, 0.9, "2024-01-02");
        assert!(state.positions.is_empty());
        assert!(state.trade_log.is_empty());
        assert!(state.day_trade.is_none());
        assert_eq!(state.remaining_capital, 100_000.0);
    }

    #[test]
    fn buy_creates_lot_and_event() {
        let config = config(true);
        let mut state = EngineState::new(&config);
        state.current_price = 0.98;
        buy(&mut state, &config, 2.0, "2024-01-02");

        assert_eq!(state.positions.len(), 1);
        assert_eq!(state.remaining_capital, 98_000.0);
        assert_eq!(state.total_invested, 2_000.0);
        let lot = state.positions[0];
        assert!((lot.shares - 2000.0 / 0.98).abs() < 1e-9);

        match state.day_trade.as_ref().unwrap() {
            TradeEvent::Buy {
                units,
                amount,
                remaining_capital,
                ..
            } => {
                assert_eq!(*units, 2.0);
                assert_eq!(*amount, 2_000.0);
                assert_eq!(*remaining_capital, 98_000.0);
            }
            other => panic!("expected buy, got {other:?}"),
        }
        assert_eq!(state.trade_log.len(), 1);
    }

    #[test]
    fn buy_capped_by_remaining_cash() {
        let config = SimulationConfig {
            total_capital: 1_500.0,
            ..Default::default()
        };
        let mut state = EngineState::new(&config);
        buy(&mut state, &config, 3.0, "2024-01-02");
        assert_eq!(state.remaining_capital, 0.0);
        assert_eq!(state.total_invested, 1_500.0);
        assert_eq!(state.trade_log[0].amount(), 1_500.0);
    }

    #[test]
    fn unit_count_beyond_integer_range_buys_in_full() {
        let config = SimulationConfig {
            total_capital: 1e9,
            buy_amount_per_unit: 1e-3,
            min_buy_drop_percent: 1e-9,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(unit_count(10.0, &config), 1e10);

        let mut state = EngineState::new(&config);
        buy(&mut state, &config, 10.0, "2024-01-02");
        let spent = config.total_capital - state.remaining_capital;
        assert!((spent - 1e7).abs() < 1e-3, "spent {spent}");
        assert_eq!(state.trade_log[0].amount(), spent);
    }

    #[test]
    fn no_cash_is_noop() {
        let config = config(true);
        let mut state = EngineState::new(&config);
        state.remaining_capital = 0.0;
        buy(&mut state, &config, 5.0, "2024-01-02");
        assert!(state.trade_log.is_empty());
    }
}
