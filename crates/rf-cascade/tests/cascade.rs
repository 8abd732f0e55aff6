//! Integration test: cascades on a two-tree grid.
//!
//! ```text
//!   row 1:  [ ] -> [C] -> [ ] -> [ ] -> [ ] -> [x]
//!   row 0:  [A] -> [ ] -> [B] -> [ ] -> [ ] -> [x]
//! ```
//!
//! Every row drains east into a cell without a direction. Reaches are
//! 43.2 km, so at 1 m/s each reach adds half a day of lag. A stores water
//! along a rising rule curve; B and C hold a flat curve.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use rf_cascade::{
    CascadeError, CascadeOptions, DeltaBaseline, ExecutionMode, OrderingPolicy, Period, ReservoirOutcome,
    SkipReason, order_upstream_first, run_cascade,
};
use rf_core::{Flow, Volume, mps};
use rf_network::{CellIndex, FlowNetwork, GridCell, GridSpec, NetworkError};
use rf_reservoir::{AnnualProfile, OperatingLimits, ProfileRow, Reservoir};
use rf_routing::{FlowField, FlowStore};

const NLON: usize = 6;
const FIELD_DAYS: usize = 30;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn network() -> FlowNetwork {
    let grid = GridSpec::new(35.0, -85.0, 2, NLON, 0.5).unwrap();
    let row = [Some(3), Some(3), Some(3), Some(3), Some(3), Some(0)];
    let codes: Vec<Option<i64>> = row.iter().chain(row.iter()).copied().collect();
    FlowNetwork::from_codes(grid, &codes, &vec![Some(43_200.0); 2 * NLON]).unwrap()
}

fn cell(row: usize, col: usize) -> GridCell {
    GridCell::new(35.0 + 0.5 * row as f64, -85.0 + 0.5 * col as f64)
}

fn idx(row: usize, col: usize) -> CellIndex {
    CellIndex::new(row * NLON + col)
}

fn dam(id: u32, name: &str, location: GridCell) -> Reservoir {
    Reservoir {
        id,
        name: name.to_string(),
        location,
        limits: OperatingLimits::new(
            Volume::from_acre_feet(1_000_000.0),
            Volume::ZERO,
            Flow::from_cfs(10_000.0),
            Flow::from_cfs(500.0),
        )
        .unwrap(),
        operation_start: d(1940, 1, 1),
    }
}

fn profile(target_af: impl Fn(u32) -> f64) -> AnnualProfile {
    let rows = d(2001, 1, 1)
        .iter_days()
        .take(365)
        .map(|date| ProfileRow {
            month: date.month(),
            day: date.day(),
            target: Volume::from_acre_feet(target_af(date.ordinal())),
        })
        .collect();
    AnnualProfile::new(rows).unwrap()
}

fn profiles() -> HashMap<u32, AnnualProfile> {
    let mut p = HashMap::new();
    p.insert(1, profile(|doy| 1_000.0 * doy as f64));
    p.insert(2, profile(|_| 50_000.0));
    p.insert(3, profile(|_| 50_000.0));
    p
}

fn field(cfs: impl Fn(usize, usize) -> f64) -> FlowField {
    let n_cells = 2 * NLON;
    let values = (0..n_cells)
        .flat_map(|c| (0..FIELD_DAYS).map(move |t| (c, t)))
        .map(|(c, t)| cfs(c, t))
        .collect();
    FlowField::from_cell_major(d(2000, 1, 1), n_cells, FIELD_DAYS, values).unwrap()
}

fn period() -> Period {
    Period::new(d(2000, 1, 1), d(2000, 1, 20))
}

fn options() -> CascadeOptions {
    CascadeOptions {
        velocity: mps(1.0),
        ..CascadeOptions::default()
    }
}

fn inflow_of(outcome: &ReservoirOutcome) -> Vec<f64> {
    outcome
        .operated()
        .unwrap()
        .inflow
        .values()
        .iter()
        .map(|q| q.cfs())
        .collect()
}

#[test]
fn upstream_release_reaches_downstream_dam() {
    let net = network();
    let dams = [dam(1, "A", cell(0, 0)), dam(2, "B", cell(0, 2)), dam(3, "C", cell(1, 1))];
    let out = run_cascade(&dams, &profiles(), field(|_, _| 1_000.0), &net, period(), &options()).unwrap();

    assert_eq!(out.operated().count(), 3);
    let a = out.reservoir(1).unwrap().operated().unwrap();
    // A fills along its rising curve: after day 1 only the minimum goes out
    assert_eq!(a.release.values()[0].cfs(), 1_000.0);
    assert_eq!(a.release.values()[1].cfs(), 500.0);

    // B sees A's release one day later (two half-day reaches)
    let b_inflow = inflow_of(out.reservoir(2).unwrap());
    assert_eq!(b_inflow[0], 1_000.0);
    assert_eq!(b_inflow[1], 1_000.0);
    assert_eq!(b_inflow[2], 500.0);

    // dam cells hold their releases
    let b = out.reservoir(2).unwrap().operated().unwrap();
    for (t, q) in b.release.values().iter().enumerate() {
        assert_eq!(out.field.column(idx(0, 2))[t], q.cfs());
    }

    // the other tree is untouched by A and B
    let c_inflow = inflow_of(out.reservoir(3).unwrap());
    assert!(c_inflow.iter().all(|&q| q == 1_000.0));
    assert_eq!(out.delta.column(idx(1, 0)), &[0.0; FIELD_DAYS]);
}

#[test]
fn strict_ordering_rejects_downstream_first() {
    let net = network();
    let dams = [dam(2, "B", cell(0, 2)), dam(1, "A", cell(0, 0))];
    let err = run_cascade(&dams, &profiles(), field(|_, _| 1_000.0), &net, period(), &options()).unwrap_err();
    assert_eq!(err, CascadeError::OrderingViolation { dam: 2, upstream: 1 });
}

#[test]
fn cascade_order_changes_results() {
    let net = network();
    // a higher floor keeps B from passing its inflow straight through
    let mut b = dam(2, "B", cell(0, 2));
    b.limits.min_release = Flow::from_cfs(800.0);
    let forward = [dam(1, "A", cell(0, 0)), b.clone()];
    let reverse = [b, dam(1, "A", cell(0, 0))];
    let opts = CascadeOptions {
        ordering: OrderingPolicy::Warn,
        ..options()
    };

    let f = run_cascade(&forward, &profiles(), field(|_, _| 1_000.0), &net, period(), &opts).unwrap();
    let r = run_cascade(&reverse, &profiles(), field(|_, _| 1_000.0), &net, period(), &opts).unwrap();

    assert_ne!(inflow_of(f.reservoir(2).unwrap()), inflow_of(r.reservoir(2).unwrap()));
    assert!(inflow_of(r.reservoir(2).unwrap()).iter().all(|&q| q == 1_000.0));
    assert_ne!(f.field, r.field);

    let reordered = order_upstream_first(&reverse, &net).unwrap();
    let ids: Vec<u32> = reordered.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn unusable_dams_are_skipped() {
    let net = network();
    let mut late = dam(3, "C", cell(1, 1));
    late.operation_start = d(2001, 1, 1);
    let dams = [
        dam(1, "A", cell(0, 0)),
        dam(7, "Offgrid", GridCell::new(10.0, 10.0)),
        dam(8, "NoCurve", cell(0, 4)),
        late,
    ];

    let out = run_cascade(&dams, &profiles(), field(|_, _| 1_000.0), &net, period(), &options()).unwrap();

    assert_eq!(out.operated().count(), 1);
    let skipped: Vec<(u32, SkipReason)> = out.skipped().map(|(id, r)| (id, r.clone())).collect();
    assert_eq!(skipped[0], (7, SkipReason::OutsideGrid));
    assert!(matches!(skipped[1], (8, SkipReason::ProfileUnavailable { .. })));
    assert_eq!(skipped[2], (3, SkipReason::EmptyOperatingWindow));
    // order of the input is kept
    let ids: Vec<u32> = out.reservoirs.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![1, 7, 8, 3]);
}

#[test]
fn late_start_truncates_window() {
    let net = network();
    let mut a = dam(1, "A", cell(0, 0));
    a.operation_start = d(2000, 1, 11);
    let out = run_cascade(&[a], &profiles(), field(|_, _| 1_000.0), &net, period(), &options()).unwrap();

    let op = out.reservoir(1).unwrap().operated().unwrap();
    assert_eq!(op.release.start(), d(2000, 1, 11));
    assert_eq!(op.release.len(), 10);
    // nothing changes before operation starts
    assert!(out.delta.column(idx(0, 0))[..10].iter().all(|&v| v == 0.0));
}

#[test]
fn pristine_baseline_double_counts_upstream_change() {
    let net = network();
    let dams = [dam(1, "A", cell(0, 0)), dam(2, "B", cell(0, 2))];
    let cascaded = run_cascade(&dams, &profiles(), field(|_, _| 1_000.0), &net, period(), &options()).unwrap();
    let pristine = run_cascade(
        &dams,
        &profiles(),
        field(|_, _| 1_000.0),
        &net,
        period(),
        &CascadeOptions {
            baseline: DeltaBaseline::Pristine,
            ..options()
        },
    )
    .unwrap();

    // B sees the same regulated inflow and releases the same either way
    let b_c = cascaded.reservoir(2).unwrap().operated().unwrap();
    let b_p = pristine.reservoir(2).unwrap().operated().unwrap();
    assert_eq!(b_c.release, b_p.release);

    // below B the pristine run adds A's change a second time
    let upstream_change: f64 = b_c.inflow.values().iter().map(|q| 1_000.0 - q.cfs()).sum();
    assert!(upstream_change > 0.0);
    let below_b = idx(0, 3);
    let extra: f64 = cascaded
        .field
        .column(below_b)
        .iter()
        .zip(pristine.field.column(below_b))
        .map(|(c, p)| c - p)
        .sum();
    assert!((extra - upstream_change).abs() < 1e-6);
}

#[test]
fn cycle_aborts_before_any_dam() {
    // 2 x 2 ring: (0,0) N -> (1,0) E -> (1,1) S -> (0,1) W -> (0,0)
    let grid = GridSpec::new(35.0, -85.0, 2, 2, 0.5).unwrap();
    let net = FlowNetwork::from_codes(grid, &[Some(1), Some(7), Some(3), Some(5)], &[Some(1.0); 4]).unwrap();
    let field = FlowField::zeros(d(2000, 1, 1), 4, FIELD_DAYS);
    let dams = [dam(1, "A", GridCell::new(35.0, -85.0))];

    let err = run_cascade(&dams, &profiles(), field, &net, period(), &options()).unwrap_err();
    assert!(matches!(err, CascadeError::Network(NetworkError::CycleDetected { .. })));
}

#[test]
fn preconditions_checked() {
    let net = network();
    let dams = [dam(1, "A", cell(0, 0))];

    let small = FlowField::zeros(d(2000, 1, 1), 3, FIELD_DAYS);
    assert!(matches!(
        run_cascade(&dams, &profiles(), small, &net, period(), &options()),
        Err(CascadeError::ShapeMismatch { .. })
    ));

    let late = Period::new(d(2000, 1, 15), d(2000, 2, 15));
    assert!(matches!(
        run_cascade(&dams, &profiles(), field(|_, _| 0.0), &net, late, &options()),
        Err(CascadeError::InvalidPeriod { .. })
    ));

    let backwards = Period::new(d(2000, 1, 15), d(2000, 1, 1));
    assert!(matches!(
        run_cascade(&dams, &profiles(), field(|_, _| 0.0), &net, backwards, &options()),
        Err(CascadeError::InvalidPeriod { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn parallel_matches_sequential(seed in prop::collection::vec(0.0_f64..20_000.0, 2 * NLON)) {
        let net = network();
        let dams = [dam(1, "A", cell(0, 0)), dam(3, "C", cell(1, 1)), dam(2, "B", cell(0, 2))];
        let make = || field(|c, t| seed[c] * (1.0 + 0.1 * (t % 7) as f64));

        let seq = run_cascade(&dams, &profiles(), make(), &net, period(), &options()).unwrap();
        let par = run_cascade(
            &dams,
            &profiles(),
            make(),
            &net,
            period(),
            &CascadeOptions {
                execution: ExecutionMode::ParallelSubBasins,
                ..options()
            },
        )
        .unwrap();

        prop_assert_eq!(&seq.field, &par.field);
        prop_assert_eq!(&seq.delta, &par.delta);
        prop_assert_eq!(&seq.reservoirs, &par.reservoirs);
    }
}
