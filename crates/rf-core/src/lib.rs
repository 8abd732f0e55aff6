//! rf-core: stable foundation for regflow.
//!
//! Contains:
//! - units (volume/flow newtypes + uom length/velocity/time)
//! - numeric (Real + tolerances + float helpers)
//! - series (date-indexed daily series)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod series;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{RfError, RfResult};
pub use numeric::*;
pub use series::DailySeries;
pub use units::*;
