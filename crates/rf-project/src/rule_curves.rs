//! Annual rule-curve text files.
//!
//! One header line, then whitespace-separated `month day storage_acre_feet`
//! rows. Month and day may be written as floats (`1.0`).

use std::path::{Path, PathBuf};

use rf_core::Volume;
use rf_reservoir::{AnnualProfile, ProfileRow, Reservoir, ReservoirError, ReservoirResult, RuleCurveSource};

use crate::{ProjectError, ProjectResult};

pub fn parse_rule_curve(text: &str) -> ProjectResult<AnnualProfile> {
    let mut rows = Vec::new();
    for (n, line) in text.lines().enumerate().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let line_no = n + 1;
        if fields.len() != 3 {
            return Err(ProjectError::Parse {
                line: line_no,
                what: format!("expected 3 columns, found {}", fields.len()),
            });
        }
        let month = calendar_field(fields[0], line_no, "month")?;
        let day = calendar_field(fields[1], line_no, "day")?;
        let target: f64 = fields[2].parse().map_err(|_| ProjectError::Parse {
            line: line_no,
            what: format!("storage '{}' is not a number", fields[2]),
        })?;
        rows.push(ProfileRow {
            month,
            day,
            target: Volume::from_acre_feet(target),
        });
    }
    Ok(AnnualProfile::new(rows)?)
}

fn calendar_field(token: &str, line: usize, what: &str) -> ProjectResult<u32> {
    let bad = || ProjectError::Parse {
        line,
        what: format!("{} '{}' is not a whole number", what, token),
    };
    let v: f64 = token.parse().map_err(|_| bad())?;
    if v.fract() != 0.0 || !(1.0..=31.0).contains(&v) {
        return Err(bad());
    }
    Ok(v as u32)
}

pub fn load_rule_curve(path: &Path) -> ProjectResult<AnnualProfile> {
    let text = std::fs::read_to_string(path)?;
    parse_rule_curve(&text)
}

/// File name of a dam's rule curve: `dam{id}_{name}.txt`, spaces in the
/// name replaced by underscores.
pub fn rule_curve_file_name(id: u32, name: &str) -> String {
    format!("dam{}_{}.txt", id, name.replace(' ', "_"))
}

/// Rule curves stored one file per dam in a directory.
#[derive(Debug, Clone)]
pub struct DirectoryRuleCurves {
    dir: PathBuf,
}

impl DirectoryRuleCurves {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, reservoir: &Reservoir) -> PathBuf {
        self.dir.join(rule_curve_file_name(reservoir.id, &reservoir.name))
    }
}

impl RuleCurveSource for DirectoryRuleCurves {
    fn annual_profile(&self, reservoir: &Reservoir) -> ReservoirResult<AnnualProfile> {
        let path = self.path_for(reservoir);
        load_rule_curve(&path).map_err(|e| ReservoirError::ProfileUnavailable {
            reservoir: reservoir.id,
            reason: format!("{}: {}", path.display(), e),
        })
    }
}
