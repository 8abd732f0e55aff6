//! Results of a cascade run.

use std::fmt;

use rf_core::{DailySeries, Flow, Volume};
use rf_network::{CellIndex, GridCell};
use rf_reservoir::RuleCurve;
use rf_routing::{FlowField, PropagationReport};

/// Simulated operation of one reservoir over its operating window.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationResult {
    pub id: u32,
    pub name: String,
    pub location: GridCell,
    pub cell: CellIndex,
    pub rule_curve: RuleCurve,
    /// Inflow the simulation used (regulated by upstream dams)
    pub inflow: DailySeries<Flow>,
    pub release: DailySeries<Flow>,
    pub storage: DailySeries<Volume>,
    pub propagation: PropagationReport,
}

/// Why a reservoir was not operated.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    OutsideGrid,
    ProfileUnavailable { reason: String },
    MissingProfileRow { month: u32, day: u32 },
    /// Operation starts after the simulation period ends.
    EmptyOperatingWindow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::OutsideGrid => write!(f, "dam location is not a grid cell"),
            SkipReason::ProfileUnavailable { reason } => write!(f, "no rule curve: {}", reason),
            SkipReason::MissingProfileRow { month, day } => {
                write!(f, "rule curve has no row for {:02}-{:02}", month, day)
            }
            SkipReason::EmptyOperatingWindow => write!(f, "operation starts after the period"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReservoirOutcome {
    Operated(OperationResult),
    Skipped { id: u32, name: String, reason: SkipReason },
}

impl ReservoirOutcome {
    pub fn id(&self) -> u32 {
        match self {
            ReservoirOutcome::Operated(op) => op.id,
            ReservoirOutcome::Skipped { id, .. } => *id,
        }
    }

    pub fn operated(&self) -> Option<&OperationResult> {
        match self {
            ReservoirOutcome::Operated(op) => Some(op),
            ReservoirOutcome::Skipped { .. } => None,
        }
    }
}

/// Regulated field, its change against the input, and per-dam outcomes in
/// run order.
#[derive(Clone, Debug)]
pub struct CascadeOutcome {
    pub field: FlowField,
    pub delta: FlowField,
    pub reservoirs: Vec<ReservoirOutcome>,
}

impl CascadeOutcome {
    pub fn operated(&self) -> impl Iterator<Item = &OperationResult> {
        self.reservoirs.iter().filter_map(ReservoirOutcome::operated)
    }

    pub fn skipped(&self) -> impl Iterator<Item = (u32, &SkipReason)> {
        self.reservoirs.iter().filter_map(|r| match r {
            ReservoirOutcome::Skipped { id, reason, .. } => Some((*id, reason)),
            ReservoirOutcome::Operated(_) => None,
        })
    }

    pub fn reservoir(&self, id: u32) -> Option<&ReservoirOutcome> {
        self.reservoirs.iter().find(|r| r.id() == id)
    }

    /// Values dropped past the end of the field across all propagations.
    pub fn clipped_values(&self) -> usize {
        self.operated().map(|op| op.propagation.clipped_values).sum()
    }
}
