//! Cascade runner.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use rf_network::{CellIndex, FlowNetwork, validate};
use rf_reservoir::{Reservoir, ReservoirError, RuleCurveSource, build_rule_curve, simulate};
use rf_routing::{BasinOverlay, FlowField, FlowStore, RoutingError, propagate};
use tracing::{info, warn};

use crate::error::{CascadeError, CascadeResult};
use crate::options::{CascadeOptions, DeltaBaseline, ExecutionMode, Period};
use crate::ordering::{check_ordering, resolve_cells};
use crate::outcome::{CascadeOutcome, OperationResult, ReservoirOutcome, SkipReason};

/// Operate `reservoirs` in order against `field` over `period`.
///
/// Structural problems (shape, period, cycles, ordering under
/// `OrderingPolicy::Strict`) abort before any dam runs. Per-dam data
/// problems skip that dam and are reported in the outcome.
pub fn run_cascade(
    reservoirs: &[Reservoir],
    source: &(dyn RuleCurveSource + Sync),
    field: FlowField,
    network: &FlowNetwork,
    period: Period,
    options: &CascadeOptions,
) -> CascadeResult<CascadeOutcome> {
    check_preconditions(&field, network, period, options)?;
    check_ordering(reservoirs, network, options.ordering)?;

    info!(
        dams = reservoirs.len(),
        start = %period.start,
        end = %period.end,
        mode = ?options.execution,
        "starting cascade"
    );

    let cells = resolve_cells(reservoirs, network);
    let original = field.clone();
    let ctx = DamContext {
        source,
        network,
        period,
        options,
        pristine: &original,
    };

    let (field, outcomes) = match options.execution {
        ExecutionMode::Sequential => {
            let mut field = field;
            let mut outcomes = Vec::with_capacity(reservoirs.len());
            for (reservoir, cell) in reservoirs.iter().zip(&cells) {
                outcomes.push(ctx.run_dam(reservoir, *cell, &mut field)?);
            }
            (field, outcomes)
        }
        ExecutionMode::ParallelSubBasins => run_sub_basins(&ctx, reservoirs, &cells, field)?,
    };

    let delta = field.difference(&original)?;
    let outcome = CascadeOutcome {
        field,
        delta,
        reservoirs: outcomes,
    };
    info!(
        operated = outcome.operated().count(),
        skipped = outcome.skipped().count(),
        clipped = outcome.clipped_values(),
        "cascade finished"
    );
    Ok(outcome)
}

fn check_preconditions(
    field: &FlowField,
    network: &FlowNetwork,
    period: Period,
    options: &CascadeOptions,
) -> CascadeResult<()> {
    if field.n_cells() != network.cell_count() {
        return Err(CascadeError::ShapeMismatch {
            what: "flow field cells",
            expected: network.cell_count(),
            actual: field.n_cells(),
        });
    }
    if period.start > period.end {
        return Err(CascadeError::InvalidPeriod {
            start: period.start,
            end: period.end,
            what: "start is after end",
        });
    }
    if !field.covers(period.start, period.end) {
        return Err(CascadeError::InvalidPeriod {
            start: period.start,
            end: period.end,
            what: "outside the flow field dates",
        });
    }
    let v = options.velocity.value;
    if !(v.is_finite() && v > 0.0) {
        return Err(RoutingError::InvalidVelocity {
            what: "must be finite and positive",
        }
        .into());
    }
    validate::ensure_acyclic(network)?;
    Ok(())
}

/// Dams grouped by drainage tree, run one tree per task on a copy-on-write
/// overlay and merged afterwards. Trees share no cells, so the merge order
/// does not matter.
fn run_sub_basins(
    ctx: &DamContext<'_>,
    reservoirs: &[Reservoir],
    cells: &[Option<CellIndex>],
    mut field: FlowField,
) -> CascadeResult<(FlowField, Vec<ReservoirOutcome>)> {
    let mut outcomes: Vec<Option<ReservoirOutcome>> = vec![None; reservoirs.len()];
    let mut groups: BTreeMap<CellIndex, Vec<usize>> = BTreeMap::new();
    for (i, cell) in cells.iter().enumerate() {
        match cell {
            Some(cell) => groups
                .entry(ctx.network.basin_root(*cell)?)
                .or_default()
                .push(i),
            None => outcomes[i] = Some(skip(&reservoirs[i], SkipReason::OutsideGrid)),
        }
    }

    info!(basins = groups.len(), "running sub-basins in parallel");

    let base = &field;
    let results: Vec<CascadeResult<(Vec<(usize, ReservoirOutcome)>, HashMap<CellIndex, Vec<f64>>)>> = groups
        .into_values()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|members| {
            let mut overlay = BasinOverlay::new(base);
            let mut done = Vec::with_capacity(members.len());
            for i in members {
                done.push((i, ctx.run_dam(&reservoirs[i], cells[i], &mut overlay)?));
            }
            Ok((done, overlay.into_columns()))
        })
        .collect();

    for result in results {
        let (done, columns) = result?;
        field.apply_columns(columns)?;
        for (i, outcome) in done {
            outcomes[i] = Some(outcome);
        }
    }

    let outcomes = outcomes
        .into_iter()
        .map(|o| {
            o.ok_or(CascadeError::Invariant {
                what: "every dam is grouped or skipped",
            })
        })
        .collect::<CascadeResult<Vec<_>>>()?;
    Ok((field, outcomes))
}

fn skip(reservoir: &Reservoir, reason: SkipReason) -> ReservoirOutcome {
    warn!(dam = reservoir.id, name = %reservoir.name, %reason, "skipping dam");
    ReservoirOutcome::Skipped {
        id: reservoir.id,
        name: reservoir.name.clone(),
        reason,
    }
}

/// Read-only state shared by every dam of a run.
struct DamContext<'a> {
    source: &'a (dyn RuleCurveSource + Sync),
    network: &'a FlowNetwork,
    period: Period,
    options: &'a CascadeOptions,
    /// Input field before any regulation
    pristine: &'a FlowField,
}

impl DamContext<'_> {
    fn run_dam<S: FlowStore>(
        &self,
        reservoir: &Reservoir,
        cell: Option<CellIndex>,
        store: &mut S,
    ) -> CascadeResult<ReservoirOutcome> {
        let Some(cell) = cell else {
            return Ok(skip(reservoir, SkipReason::OutsideGrid));
        };

        let profile = match self.source.annual_profile(reservoir) {
            Ok(profile) => profile,
            Err(e) => {
                let reason = SkipReason::ProfileUnavailable {
                    reason: e.to_string(),
                };
                return Ok(skip(reservoir, reason));
            }
        };

        let rule_curve = match build_rule_curve(&profile, self.period.start, self.period.end) {
            Ok(curve) => curve.truncate_before(reservoir.operation_start),
            Err(ReservoirError::MissingProfileRow { month, day }) => {
                return Ok(skip(reservoir, SkipReason::MissingProfileRow { month, day }));
            }
            Err(e) => return Err(e.into()),
        };
        let Some(initial_storage) = rule_curve.first() else {
            return Ok(skip(reservoir, SkipReason::EmptyOperatingWindow));
        };

        let inflow = store.window(cell, rule_curve.start(), rule_curve.len())?;
        let operation = simulate(&inflow, &rule_curve, initial_storage, &reservoir.limits)?;

        let baseline = match self.options.baseline {
            DeltaBaseline::Cascaded => inflow.clone(),
            DeltaBaseline::Pristine => self.pristine.window(cell, rule_curve.start(), rule_curve.len())?,
        };
        let propagation = propagate(
            self.network,
            store,
            cell,
            &baseline,
            &operation.release,
            self.options.velocity,
        )?;

        info!(
            dam = reservoir.id,
            name = %reservoir.name,
            days = rule_curve.len(),
            reaches = propagation.cells_touched,
            "operated dam"
        );

        Ok(ReservoirOutcome::Operated(OperationResult {
            id: reservoir.id,
            name: reservoir.name.clone(),
            location: reservoir.location,
            cell,
            rule_curve,
            inflow,
            release: operation.release,
            storage: operation.storage,
            propagation,
        }))
    }
}
