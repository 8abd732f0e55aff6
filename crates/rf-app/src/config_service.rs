//! Run configuration loading and pre-run checks.

use std::path::{Path, PathBuf};

use rf_cascade::{OrderingPolicy, check_ordering};
use rf_project::{OrderingDef, RunConfig, load_inputs, load_yaml};
use rf_routing::FlowStore;

use crate::error::{AppError, AppResult};

/// Findings from checking a configuration and its inputs without running.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub config_name: String,
    pub dams: usize,
    pub cells: usize,
    pub field_days: usize,
    pub period_days: usize,
    /// Dams whose rule-curve file does not exist
    pub missing_rule_curves: Vec<u32>,
    /// Dams whose location is outside the grid
    pub off_grid: Vec<u32>,
    /// Ordering violation that would abort a strict run
    pub ordering_problem: Option<String>,
    pub period_covered: bool,
}

impl ValidationReport {
    /// True when a run would start. Missing curves and off-grid dams only
    /// skip those dams.
    pub fn is_runnable(&self) -> bool {
        self.period_covered && self.ordering_problem.is_none()
    }
}

/// Directory relative config paths resolve against.
pub fn config_base_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load and validate a run configuration from disk.
pub fn load_config(config_path: &Path) -> AppResult<RunConfig> {
    if !config_path.is_file() {
        return Err(AppError::FileRead {
            path: config_path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
        });
    }
    Ok(load_yaml(config_path)?)
}

/// Load every input of a configuration and report what a run would do.
pub fn validate_run(config_path: &Path) -> AppResult<ValidationReport> {
    let config = load_config(config_path)?;
    let inputs = load_inputs(&config, &config_base_dir(config_path))?;
    let grid = inputs.network.grid();
    let period = config.period();

    let missing_rule_curves = inputs
        .reservoirs
        .iter()
        .filter(|r| !inputs.rule_curves.path_for(r).is_file())
        .map(|r| r.id)
        .collect();
    let off_grid = inputs
        .reservoirs
        .iter()
        .filter(|r| grid.locate(r.location).is_none())
        .map(|r| r.id)
        .collect();

    let ordering_problem = if config.options.ordering == OrderingDef::Strict {
        check_ordering(&inputs.reservoirs, &inputs.network, OrderingPolicy::Strict)
            .err()
            .map(|e| e.to_string())
    } else {
        None
    };

    Ok(ValidationReport {
        config_name: config.name.clone(),
        dams: inputs.reservoirs.len(),
        cells: inputs.network.cell_count(),
        field_days: inputs.field.n_days(),
        period_days: period.days(),
        missing_rule_curves,
        off_grid,
        ordering_problem,
        period_covered: inputs.field.covers(period.start, period.end),
    })
}
