//! Run configuration schema.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rf_cascade::{CascadeOptions, DeltaBaseline, ExecutionMode, OrderingPolicy, Period};
use rf_core::mps;
use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub version: u32,
    pub name: String,
    pub period: PeriodDef,
    pub dams: DamsDef,
    pub network: NetworkDef,
    pub input: InputDef,
    pub output: OutputDef,
    #[serde(default)]
    pub options: OptionsDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PeriodDef {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DamsDef {
    /// Dam table CSV; row order is cascade order
    pub table: PathBuf,
    /// Directory of `dam{id}_{name}.txt` rule curves
    pub rule_curve_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    pub file: PathBuf,
    pub wave_velocity_m_per_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputDef {
    pub flow: PathBuf,
    #[serde(default)]
    pub units: FlowUnits,
    /// Routing-model output carries one trailing junk day
    #[serde(default)]
    pub drop_last_day: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlowUnits {
    #[default]
    Cms,
    Cfs,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputDef {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct OptionsDef {
    #[serde(default)]
    pub ordering: OrderingDef,
    #[serde(default)]
    pub baseline: BaselineDef,
    #[serde(default)]
    pub execution: ExecutionDef,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderingDef {
    #[default]
    Strict,
    Warn,
    Ignore,
    /// Reorder the dam table upstream-first before running
    Auto,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BaselineDef {
    #[default]
    Cascaded,
    Pristine,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionDef {
    #[default]
    Sequential,
    Parallel,
}

impl RunConfig {
    pub fn period(&self) -> Period {
        Period::new(self.period.start, self.period.end)
    }

    pub fn cascade_options(&self) -> CascadeOptions {
        CascadeOptions {
            velocity: mps(self.network.wave_velocity_m_per_s),
            // the dam table is already sorted when ordering is auto
            ordering: match self.options.ordering {
                OrderingDef::Strict | OrderingDef::Auto => OrderingPolicy::Strict,
                OrderingDef::Warn => OrderingPolicy::Warn,
                OrderingDef::Ignore => OrderingPolicy::Ignore,
            },
            baseline: match self.options.baseline {
                BaselineDef::Cascaded => DeltaBaseline::Cascaded,
                BaselineDef::Pristine => DeltaBaseline::Pristine,
            },
            execution: match self.options.execution {
                ExecutionDef::Sequential => ExecutionMode::Sequential,
                ExecutionDef::Parallel => ExecutionMode::ParallelSubBasins,
            },
        }
    }

    /// Paths of the config with relative entries resolved against `base`.
    pub fn resolve_paths(&self, base: &Path) -> ConfigPaths {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        ConfigPaths {
            dam_table: resolve(&self.dams.table),
            rule_curve_dir: resolve(&self.dams.rule_curve_dir),
            network: resolve(&self.network.file),
            flow: resolve(&self.input.flow),
            output_dir: resolve(&self.output.dir),
        }
    }
}

/// Absolute locations of every file a run reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub dam_table: PathBuf,
    pub rule_curve_dir: PathBuf,
    pub network: PathBuf,
    pub flow: PathBuf,
    pub output_dir: PathBuf,
}
