//! Domain types for the dip-buying simulator

pub mod config;
pub mod fund_day;
pub mod lot;
pub mod snapshot;
pub mod trade;

pub use config::SimulationConfig;
pub use fund_day::FundDay;
pub use lot::{Lot, LotTotals, LOT_DUST_SHARES};
pub use snapshot::{DailySnapshot, HoldingBreakdown};
pub use trade::TradeEvent;
