//! Read-only downstream queries over a flow-direction grid.

use rf_core::units::{m, Length};

use crate::direction::FlowDirection;
use crate::error::{NetworkError, NetworkResult};
use crate::grid::{CellIndex, GridSpec};
use crate::validate;

/// Result of a single downstream step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextCell {
    Cell(CellIndex),
    /// No downstream cell inside the modelled basin.
    Outlet,
}

/// One cell on a downstream path, with the flow distance accumulated from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reach {
    pub cell: CellIndex,
    pub distance: Length,
}

/// The routing network: grid shape, D8 directions and per-cell flow distances.
///
/// Immutable after construction; share it by reference for the whole run.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    grid: GridSpec,
    directions: Vec<Option<FlowDirection>>,
    distances: Vec<Option<Length>>,
}

impl FlowNetwork {
    /// Build a network from parsed directions and distances in meters.
    ///
    /// Both arrays are row-major over `grid`. Every cell with a direction must
    /// carry a finite, non-negative distance.
    pub fn new(
        grid: GridSpec,
        directions: Vec<Option<FlowDirection>>,
        distances_m: &[Option<f64>],
    ) -> NetworkResult<Self> {
        validate::validate_shape("flow direction grid", &grid, directions.len())?;
        validate::validate_shape("flow distance grid", &grid, distances_m.len())?;

        let mut distances = Vec::with_capacity(distances_m.len());
        for (i, (dir, dist)) in directions.iter().zip(distances_m).enumerate() {
            let usable = dist.filter(|d| d.is_finite() && *d >= 0.0);
            if dir.is_some() && usable.is_none() {
                return Err(NetworkError::MissingDistance {
                    cell: grid.coordinate(CellIndex::new(i)),
                });
            }
            distances.push(usable.map(m));
        }

        Ok(Self {
            grid,
            directions,
            distances,
        })
    }

    /// Build a network from raw direction codes; invalid codes become outlets.
    pub fn from_codes(
        grid: GridSpec,
        codes: &[Option<i64>],
        distances_m: &[Option<f64>],
    ) -> NetworkResult<Self> {
        let directions = codes
            .iter()
            .map(|c| c.and_then(FlowDirection::from_code))
            .collect();
        Self::new(grid, directions, distances_m)
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn cell_count(&self) -> usize {
        self.grid.cell_count()
    }

    pub fn direction(&self, cell: CellIndex) -> Option<FlowDirection> {
        self.directions.get(cell.index()).copied().flatten()
    }

    /// Immediate downstream neighbour of `cell`.
    ///
    /// Returns `Outlet` when `cell` has no direction, when the neighbour is
    /// off the grid, or when the neighbour itself has no direction (it lies
    /// outside the basin).
    pub fn next_cell(&self, cell: CellIndex) -> NextCell {
        let Some(dir) = self.direction(cell) else {
            return NextCell::Outlet;
        };
        let (drow, dcol) = dir.offset();
        match self.grid.offset(cell, drow, dcol) {
            Some(next) if self.direction(next).is_some() => NextCell::Cell(next),
            _ => NextCell::Outlet,
        }
    }

    /// Flow distance stored at the neighbour `next_cell(cell)` resolves to.
    pub fn distance_to_next(&self, cell: CellIndex) -> Option<Length> {
        match self.next_cell(cell) {
            NextCell::Cell(next) => self.distances[next.index()],
            NextCell::Outlet => None,
        }
    }

    /// Every cell below `origin` down to the outlet, in flow order.
    ///
    /// The origin itself is not included. Fails with `CycleDetected` if the
    /// walk does not terminate within the grid's cell count.
    pub fn downstream_path(&self, origin: CellIndex) -> NetworkResult<Vec<Reach>> {
        let bound = self.cell_count();
        let mut path = Vec::new();
        let mut distance = m(0.0);
        let mut current = origin;

        while let NextCell::Cell(next) = self.next_cell(current) {
            if path.len() >= bound {
                return Err(NetworkError::CycleDetected {
                    start: self.grid.coordinate(origin),
                    steps: path.len(),
                });
            }
            // next has a direction, so construction guaranteed its distance
            if let Some(step) = self.distances[next.index()] {
                distance += step;
            }
            path.push(Reach {
                cell: next,
                distance,
            });
            current = next;
        }

        Ok(path)
    }

    /// Terminal cell of the drainage tree containing `cell`.
    pub fn basin_root(&self, cell: CellIndex) -> NetworkResult<CellIndex> {
        Ok(self
            .downstream_path(cell)?
            .last()
            .map_or(cell, |reach| reach.cell))
    }

    /// True when `downstream` lies on the flow path below `upstream`.
    pub fn is_upstream_of(&self, upstream: CellIndex, downstream: CellIndex) -> NetworkResult<bool> {
        Ok(self
            .downstream_path(upstream)?
            .iter()
            .any(|reach| reach.cell == downstream))
    }
}
