//! Daily flow storage and downstream propagation of regulated releases.
//!
//! Provides:
//! - `FlowField`: cell-major arena of daily flows for a whole grid
//! - `FlowStore`: column access seam shared by the field and overlays
//! - `BasinOverlay`: copy-on-write view used for parallel sub-basins
//! - `propagate`: lagged superposition of a dam's flow change downstream

pub mod error;
pub mod field;
pub mod propagate;
pub mod store;

// Re-exports for public API
pub use error::{RoutingError, RoutingResult};
pub use field::FlowField;
pub use propagate::{PropagationReport, lag_days, propagate};
pub use store::{BasinOverlay, FlowStore};
