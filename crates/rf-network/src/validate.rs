//! Grid validation logic.

use crate::error::{NetworkError, NetworkResult};
use crate::grid::{CellIndex, GridSpec};
use crate::network::{FlowNetwork, NextCell};

/// Check that an array aligned to `grid` has one entry per cell.
pub fn validate_shape(what: &'static str, grid: &GridSpec, len: usize) -> NetworkResult<()> {
    if len != grid.cell_count() {
        return Err(NetworkError::ShapeMismatch {
            what,
            expected: grid.cell_count(),
            actual: len,
        });
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Find a cell that lies on a direction cycle, if any.
///
/// Visits each cell once: O(cells).
pub fn find_cycle(network: &FlowNetwork) -> Option<CellIndex> {
    let n = network.cell_count();
    let mut marks = vec![Mark::Unvisited; n];
    let mut stack = Vec::new();

    for start in 0..n {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        let mut current = CellIndex::new(start);
        loop {
            match marks[current.index()] {
                Mark::OnStack => return Some(current),
                Mark::Done => break,
                Mark::Unvisited => {}
            }
            marks[current.index()] = Mark::OnStack;
            stack.push(current);
            match network.next_cell(current) {
                NextCell::Cell(next) => current = next,
                NextCell::Outlet => break,
            }
        }
        for cell in stack.drain(..) {
            marks[cell.index()] = Mark::Done;
        }
    }

    None
}

/// Fail with `CycleDetected` if any cell lies on a direction cycle.
pub fn ensure_acyclic(network: &FlowNetwork) -> NetworkResult<()> {
    match find_cycle(network) {
        Some(cell) => Err(NetworkError::CycleDetected {
            start: network.grid().coordinate(cell),
            steps: network.cell_count(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_reported() {
        let grid = GridSpec::new(0.0, 0.0, 2, 2, 1.0).unwrap();
        let err = validate_shape("flow field", &grid, 3).unwrap_err();
        assert_eq!(
            err,
            NetworkError::ShapeMismatch {
                what: "flow field",
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn two_cell_loop_detected() {
        // east <-> west
        let grid = GridSpec::new(0.0, 0.0, 1, 2, 1.0).unwrap();
        let net = FlowNetwork::from_codes(grid, &[Some(3), Some(7)], &[Some(1.0), Some(1.0)]).unwrap();
        assert!(find_cycle(&net).is_some());
        assert!(matches!(
            ensure_acyclic(&net),
            Err(NetworkError::CycleDetected { .. })
        ));
    }

    #[test]
    fn chain_is_acyclic() {
        let grid = GridSpec::new(0.0, 0.0, 1, 4, 1.0).unwrap();
        let net = FlowNetwork::from_codes(
            grid,
            &[Some(3), Some(3), Some(3), Some(3)],
            &[Some(1.0); 4],
        )
        .unwrap();
        assert_eq!(find_cycle(&net), None);
        assert!(ensure_acyclic(&net).is_ok());
    }
}
