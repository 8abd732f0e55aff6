//! Error types for reservoir operations.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors encountered while preparing or simulating a single reservoir.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReservoirError {
    #[error("Rule curve profile has no row for {month:02}-{day:02}")]
    MissingProfileRow { month: u32, day: u32 },

    #[error("Invalid rule curve profile: {what}")]
    InvalidProfile { what: String },

    #[error("Invalid operating limits: {what}")]
    InvalidLimits { what: &'static str },

    #[error("Inflow does not cover {start}..={end}")]
    InflowCoverage { start: NaiveDate, end: NaiveDate },

    #[error("Rule curve for reservoir {reservoir} unavailable: {reason}")]
    ProfileUnavailable { reservoir: u32, reason: String },
}

pub type ReservoirResult<T> = Result<T, ReservoirError>;
