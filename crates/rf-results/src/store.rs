//! Run storage API.
//!
//! Layout under the store root:
//!
//! ```text
//! <run_id>/manifest.json
//! <run_id>/modified_flow.json
//! <run_id>/modified_delta_flow.json
//! <run_id>/storage.dam{id}.txt
//! <run_id>/release.dam{id}.txt
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use rf_cascade::{CascadeOutcome, OperationResult};
use rf_core::{DailySeries, Flow, Volume};
use rf_project::{ConfigPaths, FlowFile};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::{ReleaseRow, RunManifest, StorageRow};
use crate::{ResultsError, ResultsResult};

#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store under `<output.dir>/runs`.
    pub fn for_config(paths: &ConfigPaths) -> ResultsResult<Self> {
        Self::new(paths.output_dir.join("runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Directory of a run. Only SHA-256 hex ids are accepted, so an id can
    /// never name a path outside the store root.
    pub fn run_dir(&self, run_id: &str) -> ResultsResult<PathBuf> {
        if !is_run_id(run_id) {
            return Err(ResultsError::InvalidRunId {
                run_id: run_id.to_string(),
            });
        }
        Ok(self.root_dir.join(run_id))
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id)
            .map(|dir| dir.join("manifest.json").exists())
            .unwrap_or(false)
    }

    /// Write every output file of a run. The manifest goes last, so a run
    /// only counts as cached once all of its files exist.
    pub fn save_run(&self, manifest: &RunManifest, outcome: &CascadeOutcome) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id)?;
        fs::create_dir_all(&run_dir)?;

        write_json(&run_dir.join("modified_flow.json"), &FlowFile::from_field(&outcome.field))?;
        write_json(
            &run_dir.join("modified_delta_flow.json"),
            &FlowFile::from_field(&outcome.delta),
        )?;

        for op in outcome.operated() {
            write_dam_files(&run_dir, op)?;
        }

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join("manifest.json"), manifest_json)?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id)?.join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_flow(&self, run_id: &str) -> ResultsResult<FlowFile> {
        self.load_json(run_id, "modified_flow.json")
    }

    pub fn load_delta(&self, run_id: &str) -> ResultsResult<FlowFile> {
        self.load_json(run_id, "modified_delta_flow.json")
    }

    /// End-of-day storage of one dam.
    pub fn load_storage(&self, run_id: &str, dam: u32) -> ResultsResult<DailySeries<Volume>> {
        let rows: Vec<StorageRow> = self.load_dam_rows(run_id, dam, "storage")?;
        let dated = rows
            .iter()
            .map(|r| (r.year, r.month, r.day, Volume::from_acre_feet(r.storage_acre_ft)))
            .collect::<Vec<_>>();
        to_series(&format!("storage.dam{}.txt", dam), &dated)
    }

    /// Daily release of one dam.
    pub fn load_release(&self, run_id: &str, dam: u32) -> ResultsResult<DailySeries<Flow>> {
        let rows: Vec<ReleaseRow> = self.load_dam_rows(run_id, dam, "release")?;
        let dated = rows
            .iter()
            .map(|r| (r.year, r.month, r.day, Flow::from_cfs(r.release_cfs)))
            .collect::<Vec<_>>();
        to_series(&format!("release.dam{}.txt", dam), &dated)
    }

    /// Raw text of a dam's storage file, as written.
    pub fn storage_file(&self, run_id: &str, dam: u32) -> ResultsResult<PathBuf> {
        self.dam_file(run_id, dam, "storage")
    }

    /// Manifests of every run made from the configuration named `config_name`.
    pub fn list_runs(&self, config_name: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id) {
                    if manifest.config_name == config_name {
                        runs.push(manifest);
                    }
                }
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id)?;
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }

    fn load_json<T: DeserializeOwned>(&self, run_id: &str, file: &str) -> ResultsResult<T> {
        let run_dir = self.existing_run_dir(run_id)?;
        let content = fs::read_to_string(run_dir.join(file))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn existing_run_dir(&self, run_id: &str) -> ResultsResult<PathBuf> {
        let run_dir = self.run_dir(run_id)?;
        if !run_dir.join("manifest.json").exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        Ok(run_dir)
    }

    fn dam_file(&self, run_id: &str, dam: u32, kind: &str) -> ResultsResult<PathBuf> {
        let path = self
            .existing_run_dir(run_id)?
            .join(format!("{}.dam{}.txt", kind, dam));
        if !path.exists() {
            return Err(ResultsError::DamNotFound {
                run_id: run_id.to_string(),
                dam,
            });
        }
        Ok(path)
    }

    fn load_dam_rows<T: DeserializeOwned>(&self, run_id: &str, dam: u32, kind: &str) -> ResultsResult<Vec<T>> {
        let path = self.dam_file(run_id, dam, kind)?;
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(path)?;
        let mut rows = Vec::new();
        for result in rdr.deserialize() {
            rows.push(result?);
        }
        Ok(rows)
    }
}

/// 64 lowercase hex digits, as produced by `compute_run_id`.
pub fn is_run_id(run_id: &str) -> bool {
    run_id.len() == 64 && run_id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> ResultsResult<()> {
    fs::write(path, serde_json::to_string(value)?)?;
    Ok(())
}

fn write_tsv<T: Serialize>(path: &Path, rows: impl Iterator<Item = T>) -> ResultsResult<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_dam_files(run_dir: &Path, op: &OperationResult) -> ResultsResult<()> {
    write_tsv(
        &run_dir.join(format!("storage.dam{}.txt", op.id)),
        op.storage.iter().map(|(date, s)| StorageRow {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            storage_acre_ft: s.acre_feet(),
        }),
    )?;
    write_tsv(
        &run_dir.join(format!("release.dam{}.txt", op.id)),
        op.release.iter().map(|(date, q)| ReleaseRow {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            release_cfs: q.cfs(),
        }),
    )
}

/// Rows must be consecutive days.
fn to_series<T: Copy>(file: &str, rows: &[(i32, u32, u32, T)]) -> ResultsResult<DailySeries<T>> {
    let corrupt = |what: String| ResultsError::Corrupt {
        file: file.to_string(),
        what,
    };
    let mut values = Vec::with_capacity(rows.len());
    let mut start = None;
    let mut expected: Option<NaiveDate> = None;
    for &(y, m, d, v) in rows {
        let date = NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| corrupt(format!("bad date {}-{}-{}", y, m, d)))?;
        if let Some(exp) = expected {
            if date != exp {
                return Err(corrupt(format!("expected {}, found {}", exp, date)));
            }
        }
        start.get_or_insert(date);
        expected = date.succ_opt();
        values.push(v);
    }
    match start {
        Some(start) => Ok(DailySeries::new(start, values)),
        None => Err(corrupt("no rows".to_string())),
    }
}
