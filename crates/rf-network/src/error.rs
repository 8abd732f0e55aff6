//! Network-specific error types.

use crate::grid::GridCell;

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Grid construction and traversal errors.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Grid geometry is unusable (non-positive spacing, empty axis, ...).
    InvalidGrid { what: &'static str },

    /// An array does not match the grid's cell count.
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A cell with a valid direction has no usable flow distance.
    MissingDistance { cell: GridCell },

    /// A coordinate does not fall on a node of the grid.
    CellOutsideGrid { cell: GridCell },

    /// Downstream traversal did not reach an outlet within the grid's cell count.
    CycleDetected { start: GridCell, steps: usize },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::InvalidGrid { what } => write!(f, "Invalid grid: {}", what),
            NetworkError::ShapeMismatch {
                what,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Shape mismatch for {}: expected {} cells, got {}",
                    what, expected, actual
                )
            }
            NetworkError::MissingDistance { cell } => {
                write!(f, "Cell {} has a flow direction but no flow distance", cell)
            }
            NetworkError::CellOutsideGrid { cell } => {
                write!(f, "Coordinate {} is not a node of the grid", cell)
            }
            NetworkError::CycleDetected { start, steps } => {
                write!(
                    f,
                    "Flow direction cycle: traversal from {} did not reach an outlet after {} steps",
                    start, steps
                )
            }
        }
    }
}

impl std::error::Error for NetworkError {}
