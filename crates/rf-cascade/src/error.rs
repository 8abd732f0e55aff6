//! Error types for cascade runs.

use chrono::NaiveDate;
use rf_network::NetworkError;
use rf_reservoir::ReservoirError;
use rf_routing::RoutingError;
use thiserror::Error;

/// Structural failures that abort a cascade run.
///
/// Per-reservoir data problems are not errors; they surface as
/// [`SkipReason`](crate::SkipReason)s in the outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CascadeError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Reservoir error: {0}")]
    Reservoir(#[from] ReservoirError),

    #[error("Shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid period {start}..={end}: {what}")]
    InvalidPeriod {
        start: NaiveDate,
        end: NaiveDate,
        what: &'static str,
    },

    #[error("Dam {dam} is listed before dam {upstream}, which lies upstream of it")]
    OrderingViolation { dam: u32, upstream: u32 },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}

pub type CascadeResult<T> = Result<T, CascadeError>;
