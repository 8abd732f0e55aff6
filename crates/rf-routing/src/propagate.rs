//! Lagged propagation of a dam's flow change down its flow path.

use rf_core::{DailySeries, Flow, Velocity, round_days, travel_days};
use rf_network::{CellIndex, FlowNetwork};
use tracing::debug;

use crate::error::{RoutingError, RoutingResult};
use crate::store::FlowStore;

/// What one propagation did to the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Downstream cells that received the delta (the dam cell excluded)
    pub cells_touched: usize,
    pub max_lag_days: i64,
    /// Shifted values that fell past the last day of the store
    pub clipped_values: usize,
}

/// Whole-day travel time of a kinematic wave over `distance`.
pub fn lag_days(distance: rf_core::Length, velocity: Velocity) -> RoutingResult<i64> {
    round_days(travel_days(distance, velocity)).map_err(|_| RoutingError::InvalidVelocity {
        what: "travel time is not finite",
    })
}

/// Write a regulated release into the store and superpose its change
/// downstream.
///
/// `release` and `baseline` must share a window that lies inside the store.
/// The dam cell is overwritten with `release`; every cell on the dam's
/// downstream path receives `release - baseline` shifted by the wave travel
/// time to that cell, added to what is already there.
pub fn propagate<S: FlowStore + ?Sized>(
    network: &FlowNetwork,
    store: &mut S,
    dam: CellIndex,
    baseline: &DailySeries<Flow>,
    release: &DailySeries<Flow>,
    velocity: Velocity,
) -> RoutingResult<PropagationReport> {
    let v = velocity.value;
    if !v.is_finite() {
        return Err(RoutingError::InvalidVelocity { what: "not finite" });
    }
    if v <= 0.0 {
        return Err(RoutingError::InvalidVelocity { what: "must be positive" });
    }
    if store.n_cells() != network.cell_count() {
        return Err(RoutingError::ShapeMismatch {
            what: "flow store cells",
            expected: network.cell_count(),
            actual: store.n_cells(),
        });
    }
    if dam.index() >= network.cell_count() {
        return Err(RoutingError::ShapeMismatch {
            what: "dam cell index",
            expected: network.cell_count(),
            actual: dam.index() + 1,
        });
    }

    let delta = release
        .zip_with(baseline, |r, b| (r - b).cfs())
        .ok_or(RoutingError::ShapeMismatch {
            what: "baseline inflow days",
            expected: release.len(),
            actual: baseline.len(),
        })?;
    let offset = store.window_offset(release.start(), release.len())?;
    let n_days = store.n_days();

    // resolve every reach before writing so a failure leaves the store untouched
    let reaches = network
        .downstream_path(dam)?
        .into_iter()
        .map(|reach| Ok((reach, lag_days(reach.distance, velocity)?)))
        .collect::<RoutingResult<Vec<_>>>()?;

    let dam_column = &mut store.column_mut(dam)[offset..offset + release.len()];
    for (slot, q) in dam_column.iter_mut().zip(release.values()) {
        *slot = q.cfs();
    }

    let mut report = PropagationReport::default();
    for (reach, lag) in reaches {
        report.max_lag_days = report.max_lag_days.max(lag);
        report.cells_touched += 1;

        // distances are non-negative, so the lag is too
        let first = offset + lag.max(0) as usize;
        let column = store.column_mut(reach.cell);
        let kept = n_days.saturating_sub(first).min(delta.len());
        for (slot, d) in column[first.min(n_days)..].iter_mut().zip(&delta.values()[..kept]) {
            *slot += d;
        }
        report.clipped_values += delta.len() - kept;
    }

    debug!(
        dam = dam.index(),
        cells = report.cells_touched,
        max_lag = report.max_lag_days,
        clipped = report.clipped_values,
        "propagated release"
    );

    Ok(report)
}
