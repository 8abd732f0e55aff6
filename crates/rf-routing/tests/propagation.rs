//! Integration test: downstream propagation on small D8 grids.
//!
//! Grid (1 x 5 strip, all draining east, last cell an outlet):
//!
//! ```text
//!   [0] -> [1] -> [2] -> [3] -> [4]x
//! ```
//!
//! Reach distances are 43.2 km, so at 1 m/s every reach adds half a day and
//! cumulative lags are round(0.5)=1, round(1.0)=1, round(1.5)=2.

use chrono::NaiveDate;
use proptest::prelude::*;
use rf_core::{DailySeries, Flow, mps};
use rf_network::{CellIndex, FlowNetwork, GridSpec, NetworkError};
use rf_routing::{BasinOverlay, FlowField, FlowStore, RoutingError, propagate};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn strip() -> FlowNetwork {
    let grid = GridSpec::new(36.0, -85.0, 1, 5, 0.125).unwrap();
    FlowNetwork::from_codes(
        grid,
        &[Some(3), Some(3), Some(3), Some(3), Some(0)],
        &[Some(43_200.0); 5],
    )
    .unwrap()
}

fn series(start: NaiveDate, cfs: &[f64]) -> DailySeries<Flow> {
    DailySeries::new(start, cfs.iter().copied().map(Flow::from_cfs).collect())
}

#[test]
fn lagged_delta_reaches_each_cell() {
    let net = strip();
    let start = d(2000, 1, 1);
    let mut field = FlowField::from_cell_major(start, 5, 6, vec![100.0; 30]).unwrap();

    let baseline = field.window(CellIndex::new(0), start, 4).unwrap();
    let release = series(start, &[130.0, 90.0, 100.0, 100.0]);

    let report = propagate(&net, &mut field, CellIndex::new(0), &baseline, &release, mps(1.0)).unwrap();

    assert_eq!(report.cells_touched, 3);
    assert_eq!(report.max_lag_days, 2);
    assert_eq!(report.clipped_values, 0);

    assert_eq!(field.column(CellIndex::new(0)), &[130.0, 90.0, 100.0, 100.0, 100.0, 100.0]);
    // lag 1
    assert_eq!(field.column(CellIndex::new(1)), &[100.0, 130.0, 90.0, 100.0, 100.0, 100.0]);
    assert_eq!(field.column(CellIndex::new(2)), &[100.0, 130.0, 90.0, 100.0, 100.0, 100.0]);
    // lag 2
    assert_eq!(field.column(CellIndex::new(3)), &[100.0, 100.0, 130.0, 90.0, 100.0, 100.0]);
    // outlet cell has no direction, so it is never reached
    assert_eq!(field.column(CellIndex::new(4)), &[100.0; 6]);
}

#[test]
fn shifts_past_the_end_are_clipped() {
    let net = strip();
    let start = d(2000, 1, 1);
    let mut field = FlowField::zeros(start, 5, 3);

    let baseline = series(start, &[0.0, 0.0, 0.0]);
    let release = series(start, &[1.0, 2.0, 3.0]);

    let report = propagate(&net, &mut field, CellIndex::new(0), &baseline, &release, mps(1.0)).unwrap();

    // lags 1, 1, 2 drop 1 + 1 + 2 values
    assert_eq!(report.clipped_values, 4);
    assert_eq!(field.column(CellIndex::new(1)), &[0.0, 1.0, 2.0]);
    assert_eq!(field.column(CellIndex::new(3)), &[0.0, 0.0, 1.0]);
}

#[test]
fn outlet_dam_only_changes_its_own_cell() {
    let grid = GridSpec::new(0.0, 0.0, 1, 3, 1.0).unwrap();
    // cell 1 drains north, off the single-row grid
    let net = FlowNetwork::from_codes(grid, &[Some(3), Some(1), Some(3)], &[Some(10.0); 3]).unwrap();
    let start = d(2001, 6, 1);
    let mut field = FlowField::from_cell_major(start, 3, 2, vec![5.0; 6]).unwrap();
    let before = field.clone();

    let baseline = field.window(CellIndex::new(1), start, 2).unwrap();
    let release = series(start, &[1.0, 9.0]);
    let report = propagate(&net, &mut field, CellIndex::new(1), &baseline, &release, mps(1.0)).unwrap();

    assert_eq!(report.cells_touched, 0);
    assert_eq!(field.column(CellIndex::new(1)), &[1.0, 9.0]);
    assert_eq!(field.column(CellIndex::new(0)), before.column(CellIndex::new(0)));
    assert_eq!(field.column(CellIndex::new(2)), before.column(CellIndex::new(2)));
}

#[test]
fn release_window_must_fit_the_field() {
    let net = strip();
    let mut field = FlowField::zeros(d(2000, 1, 1), 5, 3);
    let s = series(d(2000, 1, 2), &[0.0, 0.0, 0.0]);
    assert!(propagate(&net, &mut field, CellIndex::new(0), &s, &s, mps(1.0)).is_err());

    let short = series(d(2000, 1, 1), &[0.0]);
    let long = series(d(2000, 1, 1), &[0.0, 0.0]);
    assert!(propagate(&net, &mut field, CellIndex::new(0), &short, &long, mps(1.0)).is_err());
}

#[test]
fn cycle_leaves_the_store_untouched() {
    // cells 0 and 1 drain into each other
    let grid = GridSpec::new(36.0, -85.0, 1, 3, 0.125).unwrap();
    let net = FlowNetwork::from_codes(
        grid,
        &[Some(3), Some(7), None],
        &[Some(43_200.0), Some(43_200.0), None],
    )
    .unwrap();
    let start = d(2000, 1, 1);
    let mut field = FlowField::from_cell_major(start, 3, 3, vec![100.0; 9]).unwrap();

    let baseline = series(start, &[100.0, 100.0, 100.0]);
    let release = series(start, &[50.0, 50.0, 50.0]);
    let err = propagate(&net, &mut field, CellIndex::new(0), &baseline, &release, mps(1.0)).unwrap_err();

    assert!(matches!(err, RoutingError::Network(NetworkError::CycleDetected { .. })));
    assert_eq!(field.column(CellIndex::new(0)), &[100.0; 3]);
    assert_eq!(field.column(CellIndex::new(1)), &[100.0; 3]);
}

#[test]
fn overlay_matches_direct_writes() {
    let net = strip();
    let start = d(2000, 1, 1);
    let base = FlowField::from_cell_major(start, 5, 5, (0..25).map(f64::from).collect()).unwrap();
    let baseline = base.window(CellIndex::new(1), start, 5).unwrap();
    let release = series(start, &[3.0, 3.0, 3.0, 3.0, 3.0]);

    let mut direct = base.clone();
    propagate(&net, &mut direct, CellIndex::new(1), &baseline, &release, mps(1.0)).unwrap();

    let mut overlay = BasinOverlay::new(&base);
    propagate(&net, &mut overlay, CellIndex::new(1), &baseline, &release, mps(1.0)).unwrap();
    assert_eq!(overlay.touched(), 3);
    let mut merged = base.clone();
    merged.apply_columns(overlay.into_columns()).unwrap();

    assert_eq!(merged, direct);
}

proptest! {
    /// Without clipping, each downstream cell gains exactly the dam's total delta.
    #[test]
    fn downstream_gain_equals_total_delta(
        release in prop::collection::vec(0.0_f64..10_000.0, 1..20),
        inflow in 0.0_f64..10_000.0,
    ) {
        let net = strip();
        let n = release.len();
        let start = d(1990, 1, 1);
        // room for the largest lag
        let mut field = FlowField::from_cell_major(start, 5, n + 2, vec![inflow; 5 * (n + 2)]).unwrap();
        let before = field.clone();

        let baseline = field.window(CellIndex::new(0), start, n).unwrap();
        let release = series(start, &release);
        let report = propagate(&net, &mut field, CellIndex::new(0), &baseline, &release, mps(1.0)).unwrap();
        prop_assert_eq!(report.clipped_values, 0);

        let total_delta: f64 = release.values().iter().map(|q| q.cfs() - inflow).sum();
        for cell in 1..4 {
            let gain: f64 = field
                .column(CellIndex::new(cell))
                .iter()
                .zip(before.column(CellIndex::new(cell)))
                .map(|(a, b)| a - b)
                .sum();
            prop_assert!((gain - total_delta).abs() <= 1e-6 * (1.0 + total_delta.abs()));
        }
    }
}
