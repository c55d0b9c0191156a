use serde::{Deserialize, Serialize};

/// Lots at or below this many shares after a partial sell are dropped.
///
/// Repeated fractional sells otherwise leave an ever-growing tail of
/// near-empty lots.
pub const LOT_DUST_SHARES: f64 = 0.01;

/// One purchase tranche with its own cost basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    /// Price index at purchase.
    pub price: f64,
    /// Cost basis still attributed to this lot.
    pub amount: f64,
    pub shares: f64,
}

impl Lot {
    /// Open a lot spending `amount` at `price`.
    pub fn open(price: f64, amount: f64) -> Self {
        Self {
            price,
            amount,
            shares: amount / price,
        }
    }

    /// Scale shares and cost basis by `keep` (fraction retained).
    pub fn scaled(self, keep: f64) -> Self {
        Self {
            price: self.price,
            amount: self.amount * keep,
            shares: self.shares * keep,
        }
    }

    pub fn is_dust(&self) -> bool {
        self.shares <= LOT_DUST_SHARES
    }
}

/// Aggregate view over a set of open lots.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LotTotals {
    pub shares: f64,
    pub amount: f64,
}

impl LotTotals {
    pub fn of(lots: &[Lot]) -> Self {
        lots.iter().fold(Self::default(), |acc, lot| Self {
            shares: acc.shares + lot.shares,
            amount: acc.amount + lot.amount,
        })
    }

    /// Volume-weighted average cost, `None` with no shares held.
    pub fn avg_price(&self) -> Option<f64> {
        (self.shares > 0.0).then(|| self.amount / self.shares)
    }

    /// Percentage gain of `current_price` over the average cost (0 when flat).
    pub fn gain_percent(&self, current_price: f64) -> f64 {
        match self.avg_price() {
            Some(avg) => (current_price - avg) / avg * 100.0,
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_computes_shares() {
        let lot = Lot::open(0.8, 2000.0);
        assert!((lot.shares - 2500.0).abs() < 1e-9);
        assert_eq!(lot.price, 0.8);
    }

    #[test]
    fn scaled_keeps_price() {
        let lot = Lot::open(1.0, 1000.0).scaled(0.5);
        assert_eq!(lot.price, 1.0);
        assert_eq!(lot.amount, 500.0);
        assert_eq!(lot.shares, 500.0);
    }

    #[test]
    fn dust_threshold_is_inclusive() {
        let lot = Lot {
            price: 1.0,
            amount: 0.01,
            shares: LOT_DUST_SHARES,
        };
        assert!(lot.is_dust());
        let lot = Lot {
            shares: 0.011,
            ..lot
        };
        assert!(!lot.is_dust());
    }

    #[test]
    fn totals_average_price() {
        let lots = [Lot::open(1.0, 1000.0), Lot::open(0.5, 1000.0)];
        let totals = LotTotals::of(&lots);
        assert_eq!(totals.shares, 3000.0);
        assert_eq!(totals.amount, 2000.0);
        let avg = totals.avg_price().unwrap();
        assert!((avg - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn flat_totals_have_no_gain() {
        let totals = LotTotals::of(&[]);
        assert_eq!(totals.avg_price(), None);
        assert_eq!(totals.gain_percent(1.3), 0.0);
    }
}
