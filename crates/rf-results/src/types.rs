//! Result data types.

use chrono::NaiveDate;
use rf_cascade::{CascadeOutcome, ReservoirOutcome};
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    /// `name` of the run configuration
    pub config_name: String,
    pub timestamp: String,
    pub engine_version: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub dams: Vec<DamSummary>,
    /// Lagged values that fell past the end of the flow field
    #[serde(default)]
    pub clipped_values: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DamSummary {
    pub id: u32,
    pub name: String,
    pub status: DamStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DamStatus {
    Operated {
        first_day: NaiveDate,
        days: usize,
        cells_touched: usize,
        max_lag_days: i64,
    },
    Skipped {
        reason: String,
    },
}

impl DamSummary {
    pub fn from_outcome(outcome: &ReservoirOutcome) -> Self {
        match outcome {
            ReservoirOutcome::Operated(op) => Self {
                id: op.id,
                name: op.name.clone(),
                status: DamStatus::Operated {
                    first_day: op.release.start(),
                    days: op.release.len(),
                    cells_touched: op.propagation.cells_touched,
                    max_lag_days: op.propagation.max_lag_days,
                },
            },
            ReservoirOutcome::Skipped { id, name, reason } => Self {
                id: *id,
                name: name.clone(),
                status: DamStatus::Skipped {
                    reason: reason.to_string(),
                },
            },
        }
    }

    pub fn is_operated(&self) -> bool {
        matches!(self.status, DamStatus::Operated { .. })
    }
}

impl RunManifest {
    pub fn summarize(&mut self, outcome: &CascadeOutcome) {
        self.dams = outcome.reservoirs.iter().map(DamSummary::from_outcome).collect();
        self.clipped_values = outcome.clipped_values();
    }
}

/// One row of `storage.dam{id}.txt`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StorageRow {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub storage_acre_ft: f64,
}

/// One row of `release.dam{id}.txt`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReleaseRow {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub release_cfs: f64,
}
