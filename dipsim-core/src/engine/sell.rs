//! Sell policy: take partial profit once the position is far enough above cost.

use tracing::debug;

use crate::domain::{SimulationConfig, TradeEvent};

use super::state::EngineState;

/// Sell `sell_ratio_percent` of the position if the gain over average cost
/// is strictly above `sell_gain_threshold_percent`.
///
/// A gain exactly at the threshold holds.
pub fn check_and_sell(state: &mut EngineState, config: &SimulationConfig, date: &str) {
    let totals = state.totals();
    let Some(avg_buy_price) = totals.avg_price() else {
        return;
    };
    let gain_percent = (state.current_price - avg_buy_price) / avg_buy_price * 100.0;
    if gain_percent <= config.sell_gain_threshold_percent {
        return;
    }

    let total_shares = totals.shares;
    let sell_shares = total_shares * config.sell_ratio_percent / 100.0;
    let sell_amount = sell_shares * state.current_price;
    let sold_investment = sell_shares / total_shares * state.total_invested;
    let profit = sell_amount - sold_investment;

    let keep = config.keep_fraction();
    state.positions = state
        .positions
        .iter()
        .map(|lot| lot.scaled(keep))
        .filter(|lot| !lot.is_dust())
        .collect();

    state.remaining_capital += sell_amount;
    state.total_invested -= sold_investment;

    debug!(
        date,
        gain_percent,
        sell_amount,
        profit,
        lots = state.positions.len(),
        "partial sell"
    );

    state.record_trade(TradeEvent::SellPartial {
        date: date.to_string(),
        price: state.current_price,
        shares: sell_shares,
        amount: sell_amount,
        profit,
        sell_ratio_percent: config.sell_ratio_percent,
        avg_buy_price,
        sell_price: state.current_price,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Lot;

    fn holding_at(price: f64, config: &SimulationConfig) -> EngineState {
        let mut state = EngineState::new(config);
        state.positions.push(Lot::open(1.0, 10_000.0));
        state.remaining_capital -= 10_000.0;
        state.total_invested = 10_000.0;
        state.current_price = price;
        state
    }

    #[test]
    fn flat_position_is_noop() {
        let config = SimulationConfig::default();
        let mut state = EngineState::new(&config);
        state.current_price = 2.0;
        check_and_sell(&mut state, &config, "2024-01-02");
        assert!(state.trade_log.is_empty());
    }

    #[test]
    fn below_threshold_holds() {
        let config = SimulationConfig::default();
        let mut state = holding_at(1.04, &config);
        check_and_sell(&mut state, &config, "2024-01-02");
        assert!(state.trade_log.is_empty());
        assert_eq!(state.positions.len(), 1);
    }

    fn priced_lot_state(price: f64, config: &SimulationConfig) -> EngineState {
        // avg cost 20.0; 21.0 is a gain of exactly 5%
        let mut state = EngineState::new(config);
        state.positions.push(Lot {
            price: 20.0,
            amount: 2_000.0,
            shares: 100.0,
        });
        state.remaining_capital -= 2_000.0;
        state.total_invested = 2_000.0;
        state.current_price = price;
        state
    }

    #[test]
    fn exactly_at_threshold_holds() {
        let config = SimulationConfig::default();
        let mut state = priced_lot_state(21.0, &config);
        assert_eq!(state.current_gain_percent(), 5.0);
        check_and_sell(&mut state, &config, "2024-01-02");
        assert!(state.trade_log.is_empty());
    }

    #[test]
    fn just_above_threshold_sells() {
        let config = SimulationConfig::default();
        let mut state = priced_lot_state(21.00002, &config);
        assert!(state.current_gain_percent() > 5.0);
        check_and_sell(&mut state, &config, "2024-01-02");
        assert_eq!(state.trade_log.len(), 1);
    }

    #[test]
    fn above_threshold_sells_half() {
        let config = SimulationConfig::default();
        let mut state = holding_at(1.1, &config);
        check_and_sell(&mut state, &config, "2024-01-02");

        assert_eq!(state.trade_log.len(), 1);
        let lot = state.positions[0];
        assert!((lot.shares - 5_000.0).abs() < 1e-9);
        assert!((lot.amount - 5_000.0).abs() < 1e-9);
        assert!((state.remaining_capital - (90_000.0 + 5_500.0)).abs() < 1e-9);
        assert!((state.total_invested - 5_000.0).abs() < 1e-9);

        match &state.trade_log[0] {
            TradeEvent::SellPartial {
                shares,
                amount,
                profit,
                avg_buy_price,
                sell_price,
                ..
            } => {
                assert!((shares - 5_000.0).abs() < 1e-9);
                assert!((amount - 5_500.0).abs() < 1e-9);
                assert!((profit - 500.0).abs() < 1e-9);
                assert!((avg_buy_price - 1.0).abs() < 1e-12);
                assert_eq!(*sell_price, 1.1);
            }
            other => panic!("expected sell, got {other:?}"),
        }
    }

    #[test]
    fn full_sell_drops_every_lot() {
        let config = SimulationConfig {
            sell_ratio_percent: 100.0,
            ..Default::default()
        };
        let mut state = holding_at(1.2, &config);
        check_and_sell(&mut state, &config, "2024-01-02");
        assert!(state.positions.is_empty());
        assert!(state.total_invested.abs() < 1e-9);
        assert!((state.remaining_capital - 102_000.0).abs() < 1e-9);
    }

    #[test]
    fn dust_lots_are_dropped() {
        let config = SimulationConfig::default();
        let mut state = holding_at(1.2, &config);
        state.positions.push(Lot {
            price: 1.0,
            amount: 0.015,
            shares: 0.015,
        });
        state.total_invested += 0.015;
        check_and_sell(&mut state, &config, "2024-01-02");
        // 0.015 * 0.5 = 0.0075 <= 0.01
        assert_eq!(state.positions.len(), 1);
    }
}
