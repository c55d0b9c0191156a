//! DipSim Core — the buy-the-dip replay engine.
//!
//! This crate contains the whole simulation:
//! - Domain types (config, input day, lot, trade event, daily snapshot)
//! - Day-by-day step function with buy/sell gating
//! - Buy policy (drop units → lot) and sell policy (partial take-profit)
//! - Result aggregation into a `FinalResult`
//! - Config and dataset fingerprints
//!
//! No I/O happens here. Hosts hand in a `SimulationConfig` and a
//! chronological `&[FundDay]`, and render the `FinalResult`.

pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;

pub use domain::{DailySnapshot, FundDay, HoldingBreakdown, Lot, SimulationConfig, TradeEvent};
pub use engine::{simulate, FinalResult, Simulator};
pub use error::SimError;
