//! Reservoir operation for regflow.
//!
//! Provides:
//! - Reservoir descriptions and operating limits
//! - Annual rule-curve profiles expanded to daily target storage
//! - The daily mass-balance release policy

pub mod error;
pub mod operation;
pub mod reservoir;
pub mod rule_curve;

// Re-exports for public API
pub use error::{ReservoirError, ReservoirResult};
pub use operation::{DayStep, OperatingLimits, OperationSeries, simulate, step};
pub use reservoir::Reservoir;
pub use rule_curve::{AnnualProfile, ProfileRow, RuleCurve, RuleCurveSource, build_rule_curve};
