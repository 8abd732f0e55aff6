//! Run configuration validation.

use std::collections::HashSet;
use std::path::Path;

use rf_reservoir::Reservoir;

use crate::schema::{LATEST_VERSION, RunConfig};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing value: {field}")]
    Missing { field: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Dam number {id} appears more than once in the dam table")]
    DuplicateDam { id: u32 },
}

pub fn validate_config(config: &RunConfig) -> Result<(), ValidationError> {
    if config.version == 0 || config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    if config.name.trim().is_empty() {
        return Err(ValidationError::Missing {
            field: "name".to_string(),
        });
    }

    if config.period.start > config.period.end {
        return Err(ValidationError::InvalidValue {
            field: "period".to_string(),
            value: format!("{}..{}", config.period.start, config.period.end),
            reason: "start must not be after end".to_string(),
        });
    }

    let v = config.network.wave_velocity_m_per_s;
    if !v.is_finite() || v <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "network.wave_velocity_m_per_s".to_string(),
            value: v.to_string(),
            reason: "must be positive".to_string(),
        });
    }

    for (field, path) in [
        ("dams.table", config.dams.table.as_path()),
        ("dams.rule_curve_dir", config.dams.rule_curve_dir.as_path()),
        ("network.file", config.network.file.as_path()),
        ("input.flow", config.input.flow.as_path()),
        ("output.dir", config.output.dir.as_path()),
    ] {
        require_path(field, path)?;
    }

    Ok(())
}

/// Dam numbers name the per-dam output files, so they must be unique.
pub fn validate_dams(reservoirs: &[Reservoir]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(reservoirs.len());
    for reservoir in reservoirs {
        if !seen.insert(reservoir.id) {
            return Err(ValidationError::DuplicateDam { id: reservoir.id });
        }
    }
    Ok(())
}

fn require_path(field: &str, path: &Path) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::Missing {
            field: field.to_string(),
        });
    }
    Ok(())
}
