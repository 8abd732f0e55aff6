//! Cascade orchestration for regflow.
//!
//! Operates an ordered list of reservoirs against one flow field: each dam's
//! inflow is read from the field as regulated by the dams before it, its
//! release is simulated, and the change is propagated downstream before the
//! next dam runs.
//!
//! Provides:
//! - `run_cascade`: sequential or sub-basin parallel execution
//! - Ordering checks and `order_upstream_first`
//! - Per-reservoir outcomes with skip reasons

pub mod cascade;
pub mod error;
pub mod options;
pub mod ordering;
pub mod outcome;

// Re-exports for public API
pub use cascade::run_cascade;
pub use error::{CascadeError, CascadeResult};
pub use options::{CascadeOptions, DeltaBaseline, ExecutionMode, OrderingPolicy, Period};
pub use ordering::{check_ordering, order_upstream_first};
pub use outcome::{CascadeOutcome, OperationResult, ReservoirOutcome, SkipReason};
