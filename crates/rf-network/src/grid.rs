//! Regular lat/lon grid geometry.
//!
//! Cells are addressed two ways: by coordinate (`GridCell`, what input tables
//! carry) and by flat index (`CellIndex`, what every array in the engine is
//! keyed by). Resolution from one to the other is pure arithmetic on the
//! grid's shape, so no per-lookup hashing is needed.

use core::fmt;

use crate::error::{NetworkError, NetworkResult};

/// Fraction of a grid spacing a coordinate may deviate from a grid node.
const SNAP_TOLERANCE: f64 = 1e-6;

/// A grid node identified by its centre coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCell {
    pub lat: f64,
    pub lon: f64,
}

impl GridCell {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Flat, row-major cell index: `row * nlon + col`, row 0 at `lat0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CellIndex(usize);

impl CellIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shape of a regular grid with equal spacing in latitude and longitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    lat0: f64,
    lon0: f64,
    nlat: usize,
    nlon: usize,
    dlatlon: f64,
}

impl GridSpec {
    /// `lat0`/`lon0` are the centre of the south-west cell.
    pub fn new(lat0: f64, lon0: f64, nlat: usize, nlon: usize, dlatlon: f64) -> NetworkResult<Self> {
        if !lat0.is_finite() || !lon0.is_finite() {
            return Err(NetworkError::InvalidGrid {
                what: "origin must be finite",
            });
        }
        if !(dlatlon.is_finite() && dlatlon > 0.0) {
            return Err(NetworkError::InvalidGrid {
                what: "dlatlon must be positive",
            });
        }
        if nlat == 0 || nlon == 0 {
            return Err(NetworkError::InvalidGrid {
                what: "grid must have at least one row and one column",
            });
        }
        if nlat.checked_mul(nlon).is_none() {
            return Err(NetworkError::InvalidGrid {
                what: "cell count overflows",
            });
        }
        Ok(Self {
            lat0,
            lon0,
            nlat,
            nlon,
            dlatlon,
        })
    }

    pub fn nlat(&self) -> usize {
        self.nlat
    }

    pub fn nlon(&self) -> usize {
        self.nlon
    }

    pub fn dlatlon(&self) -> f64 {
        self.dlatlon
    }

    pub fn origin(&self) -> GridCell {
        GridCell::new(self.lat0, self.lon0)
    }

    pub fn cell_count(&self) -> usize {
        self.nlat * self.nlon
    }

    pub fn index_of(&self, row: usize, col: usize) -> Option<CellIndex> {
        if row < self.nlat && col < self.nlon {
            Some(CellIndex(row * self.nlon + col))
        } else {
            None
        }
    }

    pub fn row_col(&self, cell: CellIndex) -> (usize, usize) {
        (cell.0 / self.nlon, cell.0 % self.nlon)
    }

    /// Resolve a coordinate to its cell; `None` when it is off-grid or between nodes.
    pub fn locate(&self, cell: GridCell) -> Option<CellIndex> {
        let row = snap(cell.lat, self.lat0, self.dlatlon)?;
        let col = snap(cell.lon, self.lon0, self.dlatlon)?;
        self.index_of(row, col)
    }

    /// Like [`GridSpec::locate`] but reports the coordinate on failure.
    pub fn require(&self, cell: GridCell) -> NetworkResult<CellIndex> {
        self.locate(cell)
            .ok_or(NetworkError::CellOutsideGrid { cell })
    }

    pub fn coordinate(&self, cell: CellIndex) -> GridCell {
        let (row, col) = self.row_col(cell);
        GridCell::new(
            self.lat0 + row as f64 * self.dlatlon,
            self.lon0 + col as f64 * self.dlatlon,
        )
    }

    /// Neighbour `drow` rows and `dcol` columns away; `None` off the grid.
    pub fn offset(&self, cell: CellIndex, drow: i32, dcol: i32) -> Option<CellIndex> {
        let (row, col) = self.row_col(cell);
        let row = row.checked_add_signed(drow as isize)?;
        let col = col.checked_add_signed(dcol as isize)?;
        self.index_of(row, col)
    }
}

fn snap(value: f64, origin: f64, spacing: f64) -> Option<usize> {
    let steps = (value - origin) / spacing;
    if !steps.is_finite() {
        return None;
    }
    let nearest = steps.round();
    if (steps - nearest).abs() > SNAP_TOLERANCE || nearest < 0.0 {
        return None;
    }
    Some(nearest as usize)
}
