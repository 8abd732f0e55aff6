//! Gridded daily streamflow (JSON).

use std::path::Path;

use chrono::NaiveDate;
use rf_core::CFS_PER_CMS;
use rf_routing::{FlowField, FlowStore};
use serde::{Deserialize, Serialize};

use crate::schema::FlowUnits;
use crate::{ProjectError, ProjectResult};

/// Time-major `(day, lat, lon)` streamflow. `null` entries read as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowFile {
    pub start: NaiveDate,
    pub n_days: usize,
    pub streamflow: Vec<Option<f64>>,
}

impl FlowFile {
    /// Convert to a cell-major field in cfs.
    pub fn into_field(mut self, n_cells: usize, units: FlowUnits, drop_last_day: bool) -> ProjectResult<FlowField> {
        let mut n_days = self.n_days;
        if drop_last_day {
            n_days = n_days.checked_sub(1).ok_or_else(|| ProjectError::InvalidInput {
                what: "cannot drop the last day of an empty flow file".to_string(),
            })?;
            if self.streamflow.len() == self.n_days * n_cells {
                self.streamflow.truncate(n_days * n_cells);
            }
        }
        let scale = match units {
            FlowUnits::Cms => CFS_PER_CMS,
            FlowUnits::Cfs => 1.0,
        };
        let values: Vec<f64> = self
            .streamflow
            .iter()
            .map(|v| v.unwrap_or(0.0) * scale)
            .collect();
        Ok(FlowField::from_time_major(self.start, n_cells, n_days, &values)?)
    }

    /// Time-major cfs file of a field.
    pub fn from_field(field: &FlowField) -> Self {
        Self {
            start: field.start(),
            n_days: field.n_days(),
            streamflow: field.to_time_major().into_iter().map(Some).collect(),
        }
    }
}

pub fn load_flow_field(
    path: &Path,
    n_cells: usize,
    units: FlowUnits,
    drop_last_day: bool,
) -> ProjectResult<FlowField> {
    let content = std::fs::read_to_string(path)?;
    let file: FlowFile = serde_json::from_str(&content)?;
    file.into_field(n_cells, units, drop_last_day)
}
