//! Query helpers for extracting data from loaded runs.

use chrono::NaiveDate;
use rf_core::{DailySeries, Volume};
use rf_project::FlowFile;
use rf_results::{DamStatus, RunManifest};

use crate::error::{AppError, AppResult};

/// Summary of a run's dams and clipping.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub period: (NaiveDate, NaiveDate),
    pub operated: usize,
    pub skipped: usize,
    pub clipped_values: usize,
    /// Longest routing lag over all operated dams
    pub max_lag_days: i64,
}

/// Get run summary from a manifest.
pub fn get_run_summary(manifest: &RunManifest) -> RunSummary {
    let operated = manifest.dams.iter().filter(|d| d.is_operated()).count();
    let max_lag_days = manifest
        .dams
        .iter()
        .filter_map(|d| match d.status {
            DamStatus::Operated { max_lag_days, .. } => Some(max_lag_days),
            DamStatus::Skipped { .. } => None,
        })
        .max()
        .unwrap_or(0);

    RunSummary {
        period: (manifest.period_start, manifest.period_end),
        operated,
        skipped: manifest.dams.len() - operated,
        clipped_values: manifest.clipped_values,
        max_lag_days,
    }
}

/// Storage statistics for one dam, in acre-feet.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageStats {
    pub days: usize,
    pub min_acre_ft: f64,
    pub max_acre_ft: f64,
    pub mean_acre_ft: f64,
    pub final_acre_ft: f64,
}

pub fn storage_stats(storage: &DailySeries<Volume>) -> AppResult<StorageStats> {
    let values: Vec<f64> = storage.values().iter().map(|v| v.acre_feet()).collect();
    let Some(&final_acre_ft) = values.last() else {
        return Err(AppError::InvalidInput("Empty storage series".to_string()));
    };

    let min_acre_ft = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_acre_ft = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean_acre_ft = values.iter().sum::<f64>() / values.len() as f64;

    Ok(StorageStats {
        days: values.len(),
        min_acre_ft,
        max_acre_ft,
        mean_acre_ft,
        final_acre_ft,
    })
}

/// Number of grid cells whose flow the run changed on at least one day.
pub fn changed_cells(delta: &FlowFile) -> usize {
    if delta.n_days == 0 {
        return 0;
    }
    let n_cells = delta.streamflow.len() / delta.n_days;
    (0..n_cells)
        .filter(|&cell| {
            (0..delta.n_days).any(|day| {
                delta
                    .streamflow
                    .get(day * n_cells + cell)
                    .copied()
                    .flatten()
                    .is_some_and(|q| q != 0.0)
            })
        })
        .count()
}
