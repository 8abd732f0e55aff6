//! Column access to daily flows.

use std::collections::HashMap;

use chrono::NaiveDate;
use rf_core::{DailySeries, Flow};
use rf_network::CellIndex;

use crate::error::{RoutingError, RoutingResult};
use crate::field::FlowField;

/// Read/write access to per-cell daily flow columns [cfs].
///
/// Columns are indexed by day offset from `start()`. Implementations may
/// panic on a cell index outside `0..n_cells()`.
pub trait FlowStore {
    fn start(&self) -> NaiveDate;

    fn n_days(&self) -> usize;

    fn n_cells(&self) -> usize;

    fn column(&self, cell: CellIndex) -> &[f64];

    fn column_mut(&mut self, cell: CellIndex) -> &mut [f64];

    /// Day offset of `date`, if the store covers it.
    fn day_offset(&self, date: NaiveDate) -> Option<usize> {
        let offset = usize::try_from((date - self.start()).num_days()).ok()?;
        (offset < self.n_days()).then_some(offset)
    }

    /// `len` days of one cell starting at `start`.
    fn window(&self, cell: CellIndex, start: NaiveDate, len: usize) -> RoutingResult<DailySeries<Flow>> {
        let offset = self.window_offset(start, len)?;
        if cell.index() >= self.n_cells() {
            return Err(RoutingError::ShapeMismatch {
                what: "cell index",
                expected: self.n_cells(),
                actual: cell.index() + 1,
            });
        }
        let values = self.column(cell)[offset..offset + len]
            .iter()
            .copied()
            .map(Flow::from_cfs)
            .collect();
        Ok(DailySeries::new(start, values))
    }

    /// Offset of a `len`-day window starting at `start`, checked against the store.
    fn window_offset(&self, start: NaiveDate, len: usize) -> RoutingResult<usize> {
        let outside = RoutingError::WindowOutsideField { start, len };
        let offset = usize::try_from((start - self.start()).num_days()).map_err(|_| outside.clone())?;
        match offset.checked_add(len) {
            Some(end) if end <= self.n_days() => Ok(offset),
            _ => Err(outside),
        }
    }
}

/// Copy-on-write view of a shared base field.
///
/// Reads fall through to the base until a column is first written; the
/// written columns are collected with `into_columns` and merged back with
/// `FlowField::apply_columns`. Overlays over disjoint sets of cells can be
/// merged in any order.
#[derive(Debug)]
pub struct BasinOverlay<'a> {
    base: &'a FlowField,
    columns: HashMap<CellIndex, Vec<f64>>,
}

impl<'a> BasinOverlay<'a> {
    pub fn new(base: &'a FlowField) -> Self {
        Self {
            base,
            columns: HashMap::new(),
        }
    }

    /// Cells written through this overlay.
    pub fn touched(&self) -> usize {
        self.columns.len()
    }

    pub fn into_columns(self) -> HashMap<CellIndex, Vec<f64>> {
        self.columns
    }
}

impl FlowStore for BasinOverlay<'_> {
    fn start(&self) -> NaiveDate {
        self.base.start()
    }

    fn n_days(&self) -> usize {
        self.base.n_days()
    }

    fn n_cells(&self) -> usize {
        self.base.n_cells()
    }

    fn column(&self, cell: CellIndex) -> &[f64] {
        match self.columns.get(&cell) {
            Some(column) => column,
            None => self.base.column(cell),
        }
    }

    fn column_mut(&mut self, cell: CellIndex) -> &mut [f64] {
        let base = self.base;
        self.columns
            .entry(cell)
            .or_insert_with(|| base.column(cell).to_vec())
    }
}
