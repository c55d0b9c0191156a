//! Engine error type.

use thiserror::Error;

/// Errors raised before a simulation starts.
///
/// The replay loop itself has no failure paths; everything here is a
/// precondition check at the boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
}

impl SimError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
