//! rf-network: gridded river network layer for regflow.
//!
//! Provides:
//! - Regular lat/lon grid geometry with O(1) coordinate → cell resolution
//! - D8 flow directions
//! - `FlowNetwork`: read-only downstream queries over direction + distance grids
//! - Grid validation (shape checks, whole-grid cycle detection)
//!
//! # Example
//!
//! ```
//! use rf_network::{FlowNetwork, GridCell, GridSpec, NextCell};
//!
//! // 1 x 3 strip draining east: cell 0 -> cell 1 -> cell 2 (outlet)
//! let grid = GridSpec::new(35.0, -84.0, 1, 3, 0.125).unwrap();
//! let net = FlowNetwork::from_codes(
//!     grid,
//!     &[Some(3), Some(3), Some(0)],
//!     &[Some(10_000.0), Some(12_000.0), None],
//! )
//! .unwrap();
//!
//! let dam = net.grid().locate(GridCell::new(35.0, -84.0)).unwrap();
//! assert!(matches!(net.next_cell(dam), NextCell::Cell(_)));
//! assert_eq!(net.downstream_path(dam).unwrap().len(), 1);
//! ```

pub mod direction;
pub mod error;
pub mod grid;
pub mod network;
pub mod validate;

// Re-exports for ergonomics
pub use direction::FlowDirection;
pub use error::{NetworkError, NetworkResult};
pub use grid::{CellIndex, GridCell, GridSpec};
pub use network::{FlowNetwork, NextCell, Reach};
