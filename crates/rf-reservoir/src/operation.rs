//! Daily mass-balance release policy.
//!
//! All arithmetic runs on `Volume` (cubic feet per day) so the policy reads
//! the same way operators state it: how much water must, may and can leave
//! the reservoir today. Flows are converted at entry (`Flow::over_day`) and
//! exit (`Volume::per_day`) only.

use rf_core::{DailySeries, Flow, Volume};

use crate::error::{ReservoirError, ReservoirResult};
use crate::rule_curve::RuleCurve;

/// Capacity and release bounds of a reservoir.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OperatingLimits {
    /// Top of the flood pool
    pub top: Volume,
    /// Bottom of the active pool
    pub bottom: Volume,
    pub max_release: Flow,
    pub min_release: Flow,
}

impl OperatingLimits {
    pub fn new(top: Volume, bottom: Volume, max_release: Flow, min_release: Flow) -> ReservoirResult<Self> {
        if !(top.is_finite() && bottom.is_finite()) {
            return Err(ReservoirError::InvalidLimits {
                what: "capacities must be finite",
            });
        }
        if !(max_release.is_finite() && min_release.is_finite()) {
            return Err(ReservoirError::InvalidLimits {
                what: "release bounds must be finite",
            });
        }
        if top < bottom {
            return Err(ReservoirError::InvalidLimits {
                what: "top capacity below bottom capacity",
            });
        }
        if max_release < min_release {
            return Err(ReservoirError::InvalidLimits {
                what: "max release below min release",
            });
        }
        Ok(Self {
            top,
            bottom,
            max_release,
            min_release,
        })
    }
}

/// Intermediate quantities of one simulated day.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DayStep {
    /// Most that could leave without dropping below the bottom capacity
    pub max_available: Volume,
    /// Release that brings storage exactly to the rule curve (never negative)
    pub rule_requirement: Volume,
    /// Headroom between the rule curve and the top capacity
    pub flood_capacity: Volume,
    pub preliminary: Volume,
    pub release: Volume,
    /// Storage at the end of the day
    pub storage: Volume,
}

/// Advance one day from `storage` with the day's inflow and rule-curve target.
///
/// Storage may leave `[bottom, top]` when inflow is extreme: the release cap
/// only yields to the flood capacity, and the minimum release only yields to
/// what is physically available.
pub fn step(storage: Volume, inflow: Flow, target: Volume, limits: &OperatingLimits) -> DayStep {
    let inflow_volume = inflow.over_day();
    let max_release = limits.max_release.over_day();
    let min_release = limits.min_release.over_day();

    let max_available = storage + inflow_volume - limits.bottom;
    let rule_requirement = (storage + inflow_volume - target).max(Volume::ZERO);
    let flood_capacity = limits.top - target;

    let preliminary = max_available.min(rule_requirement.max(min_release));
    let release = if preliminary <= max_release {
        preliminary
    } else {
        max_release.max(preliminary - flood_capacity)
    };

    DayStep {
        max_available,
        rule_requirement,
        flood_capacity,
        preliminary,
        release,
        storage: storage + inflow_volume - release,
    }
}

/// Simulated release and end-of-day storage over a rule curve's window.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationSeries {
    pub release: DailySeries<Flow>,
    pub storage: DailySeries<Volume>,
}

/// Run the release policy over every day of `rule_curve`.
///
/// `inflow` may be longer than the rule curve but must cover all of its dates.
pub fn simulate(
    inflow: &DailySeries<Flow>,
    rule_curve: &RuleCurve,
    initial_storage: Volume,
    limits: &OperatingLimits,
) -> ReservoirResult<OperationSeries> {
    let start = rule_curve.start();
    let inflow = inflow
        .window(start, rule_curve.len())
        .ok_or_else(|| ReservoirError::InflowCoverage {
            start,
            end: rule_curve.end().unwrap_or(start),
        })?;

    let mut release = Vec::with_capacity(rule_curve.len());
    let mut storage = Vec::with_capacity(rule_curve.len());
    let mut s = initial_storage;

    for (&q_in, &target) in inflow.values().iter().zip(rule_curve.values()) {
        let day = step(s, q_in, target, limits);
        s = day.storage;
        release.push(day.release.per_day());
        storage.push(s);
    }

    Ok(OperationSeries {
        release: DailySeries::new(start, release),
        storage: DailySeries::new(start, storage),
    })
}
