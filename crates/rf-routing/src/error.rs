//! Error types for flow storage and propagation.

use chrono::NaiveDate;
use rf_network::NetworkError;
use thiserror::Error;

/// Errors encountered while reading, writing or routing flows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Invalid wave velocity: {what}")]
    InvalidVelocity { what: &'static str },

    #[error("Window of {len} days from {start} is outside the flow field")]
    WindowOutsideField { start: NaiveDate, len: usize },

    #[error("Shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type RoutingResult<T> = Result<T, RoutingError>;
