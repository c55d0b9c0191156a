//! Simulation engine: day-by-day replay of the dip-buying policy.
//!
//! The engine folds a chronological series of daily changes into an
//! [`EngineState`]:
//!
//! - [`step`]: per-day price update, buy/sell gating, snapshot
//! - [`buy`]: drop → unit count → lot
//! - [`sell`]: gain over average cost → partial liquidation
//! - [`result`]: snapshot fields and the final summary

pub mod buy;
pub mod loop_runner;
pub mod result;
pub mod sell;
pub mod state;
pub mod step;

pub use buy::unit_count;
pub use loop_runner::{simulate, Simulator};
pub use result::{finalize, price_change_percent, FinalResult};
pub use state::EngineState;
pub use step::{process_day, step};
