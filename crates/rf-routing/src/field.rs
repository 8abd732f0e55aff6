//! Cell-major arena of daily flows.

use chrono::NaiveDate;
use rf_core::{DailySeries, Flow};
use rf_network::CellIndex;

use crate::error::{RoutingError, RoutingResult};
use crate::store::FlowStore;

/// Daily flow [cfs] for every cell of a grid over a fixed date range.
///
/// Storage is cell-major: the `n_days` values of one cell are contiguous,
/// so extracting a dam's inflow and shifting a delta down a reach are both
/// slice operations.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    start: NaiveDate,
    n_cells: usize,
    n_days: usize,
    values: Vec<f64>,
}

impl FlowField {
    /// All-zero field.
    pub fn zeros(start: NaiveDate, n_cells: usize, n_days: usize) -> Self {
        Self {
            start,
            n_cells,
            n_days,
            values: vec![0.0; n_cells * n_days],
        }
    }

    /// Build from cell-major values (`values[cell * n_days + day]`).
    pub fn from_cell_major(
        start: NaiveDate,
        n_cells: usize,
        n_days: usize,
        values: Vec<f64>,
    ) -> RoutingResult<Self> {
        check_len(values.len(), n_cells, n_days)?;
        Ok(Self {
            start,
            n_cells,
            n_days,
            values,
        })
    }

    /// Build from time-major values (`values[day * n_cells + cell]`), the
    /// `(day, lat, lon)` layout routing models write.
    pub fn from_time_major(
        start: NaiveDate,
        n_cells: usize,
        n_days: usize,
        values: &[f64],
    ) -> RoutingResult<Self> {
        check_len(values.len(), n_cells, n_days)?;
        let mut out = vec![0.0; values.len()];
        for (day, row) in values.chunks_exact(n_cells.max(1)).enumerate().take(n_days) {
            for (cell, &v) in row.iter().enumerate() {
                out[cell * n_days + day] = v;
            }
        }
        Ok(Self {
            start,
            n_cells,
            n_days,
            values: out,
        })
    }

    /// Flatten back to the time-major layout.
    pub fn to_time_major(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.values.len()];
        for cell in 0..self.n_cells {
            let column = &self.values[cell * self.n_days..(cell + 1) * self.n_days];
            for (day, &v) in column.iter().enumerate() {
                out[day * self.n_cells + cell] = v;
            }
        }
        out
    }

    /// Last date covered, `None` for a zero-day field.
    pub fn end(&self) -> Option<NaiveDate> {
        let last = self.n_days.checked_sub(1)?;
        self.start.checked_add_days(chrono::Days::new(last as u64))
    }

    /// Whether `[start, end]` lies within the field's dates.
    pub fn covers(&self, start: NaiveDate, end: NaiveDate) -> bool {
        match self.end() {
            Some(last) => start >= self.start && end <= last && start <= end,
            None => false,
        }
    }

    pub fn get(&self, cell: CellIndex, day: usize) -> Option<f64> {
        if cell.index() >= self.n_cells || day >= self.n_days {
            return None;
        }
        Some(self.values[cell.index() * self.n_days + day])
    }

    /// Cell-by-cell difference `self - other`.
    pub fn difference(&self, other: &FlowField) -> RoutingResult<FlowField> {
        if self.start != other.start || self.n_days != other.n_days {
            return Err(RoutingError::ShapeMismatch {
                what: "flow field days",
                expected: self.n_days,
                actual: other.n_days,
            });
        }
        if self.n_cells != other.n_cells {
            return Err(RoutingError::ShapeMismatch {
                what: "flow field cells",
                expected: self.n_cells,
                actual: other.n_cells,
            });
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a - b)
            .collect();
        Ok(FlowField {
            start: self.start,
            n_cells: self.n_cells,
            n_days: self.n_days,
            values,
        })
    }

    /// Overwrite whole columns, e.g. the writes collected by a `BasinOverlay`.
    pub fn apply_columns(
        &mut self,
        columns: impl IntoIterator<Item = (CellIndex, Vec<f64>)>,
    ) -> RoutingResult<()> {
        for (cell, column) in columns {
            if column.len() != self.n_days {
                return Err(RoutingError::ShapeMismatch {
                    what: "overlay column",
                    expected: self.n_days,
                    actual: column.len(),
                });
            }
            self.checked_cell(cell)?;
            self.column_mut(cell).copy_from_slice(&column);
        }
        Ok(())
    }

    /// Daily flows of one cell as a series.
    pub fn series(&self, cell: CellIndex) -> RoutingResult<DailySeries<Flow>> {
        self.checked_cell(cell)?;
        Ok(DailySeries::new(
            self.start,
            self.column(cell).iter().copied().map(Flow::from_cfs).collect(),
        ))
    }

    fn checked_cell(&self, cell: CellIndex) -> RoutingResult<()> {
        if cell.index() < self.n_cells {
            Ok(())
        } else {
            Err(RoutingError::ShapeMismatch {
                what: "cell index",
                expected: self.n_cells,
                actual: cell.index() + 1,
            })
        }
    }
}

impl FlowStore for FlowField {
    fn start(&self) -> NaiveDate {
        self.start
    }

    fn n_days(&self) -> usize {
        self.n_days
    }

    fn n_cells(&self) -> usize {
        self.n_cells
    }

    fn column(&self, cell: CellIndex) -> &[f64] {
        let i = cell.index();
        &self.values[i * self.n_days..(i + 1) * self.n_days]
    }

    fn column_mut(&mut self, cell: CellIndex) -> &mut [f64] {
        let i = cell.index();
        &mut self.values[i * self.n_days..(i + 1) * self.n_days]
    }
}

fn check_len(len: usize, n_cells: usize, n_days: usize) -> RoutingResult<()> {
    let expected = n_cells * n_days;
    if len == expected {
        Ok(())
    } else {
        Err(RoutingError::ShapeMismatch {
            what: "flow values",
            expected,
            actual: len,
        })
    }
}
