//! Cascade run options.

use chrono::NaiveDate;
use rf_core::{Velocity, mps};

/// Inclusive simulation period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn days(&self) -> usize {
        usize::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }
}

/// What to do when a dam is listed before a dam upstream of it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// Abort with `OrderingViolation`.
    #[default]
    Strict,
    /// Log a warning and run in the given order.
    Warn,
    /// Run in the given order silently.
    Ignore,
}

/// Inflow series a dam's release is differenced against before propagation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeltaBaseline {
    /// The inflow the dam actually sees, already regulated upstream.
    #[default]
    Cascaded,
    /// The unregulated inflow at the dam cell.
    Pristine,
}

/// How dams are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    #[default]
    Sequential,
    /// One task per drainage tree, merged after all trees finish.
    ParallelSubBasins,
}

/// Options for cascade runs.
#[derive(Clone, Copy, Debug)]
pub struct CascadeOptions {
    /// Kinematic wave velocity used for lags
    pub velocity: Velocity,
    pub ordering: OrderingPolicy,
    pub baseline: DeltaBaseline,
    pub execution: ExecutionMode,
}

impl Default for CascadeOptions {
    fn default() -> Self {
        Self {
            velocity: mps(1.5),
            ordering: OrderingPolicy::default(),
            baseline: DeltaBaseline::default(),
            execution: ExecutionMode::default(),
        }
    }
}
