//! Run execution and caching service.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use rf_cascade::{ExecutionMode, run_cascade};
use rf_core::{DailySeries, Flow, Volume};
use rf_project::{FlowFile, input_files, load_inputs};
use rf_results::{RunManifest, RunStore};
use tracing::info;

use crate::config_service::{config_base_dir, load_config};
use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage};

/// Options for running a cascade.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub engine_version: String,
    /// Overrides the configured execution mode. Not part of the run id,
    /// both modes produce the same results.
    pub execution: Option<ExecutionMode>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            execution: None,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub config_path: &'a Path,
    pub options: RunOptions,
}

/// Wall-clock time spent in each stage of a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub hash_time_s: f64,
    pub load_inputs_time_s: f64,
    pub cascade_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

/// Response from executing a run.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Execute or load a run (with caching).
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingConfig,
        started,
        Some("Loading run configuration".to_string()),
    );

    let config = load_config(request.config_path)?;
    let base_dir = config_base_dir(request.config_path);

    emit_progress(
        &mut progress_cb,
        RunStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
    );

    // Run id covers the config and the bytes of every input file
    let hash_start = Instant::now();
    let files = input_files(&config, &base_dir)?;
    let contents = files
        .iter()
        .map(|path| {
            std::fs::read(path).map_err(|source| AppError::FileRead {
                path: path.clone(),
                source,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;
    let slices: Vec<&[u8]> = contents.iter().map(Vec::as_slice).collect();
    let run_id = rf_results::compute_run_id(&config, &slices, &request.options.engine_version);
    timing.hash_time_s = hash_start.elapsed().as_secs_f64();

    let store = RunStore::for_config(&config.resolve_paths(&base_dir))?;

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunStage::LoadingCachedResult,
            started,
            Some(format!("Loading cached run {}", run_id)),
        );

        let load_start = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = load_start.elapsed().as_secs_f64();
        timing.total_time_s = started.elapsed().as_secs_f64();

        info!(run_id = %run_id, "loaded cached run");

        emit_progress(
            &mut progress_cb,
            RunStage::Completed,
            started,
            Some("Loaded cached result".to_string()),
        );

        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingInputs,
        started,
        Some("Loading dams, network and flow".to_string()),
    );

    let load_start = Instant::now();
    let inputs = load_inputs(&config, &base_dir)?;
    timing.load_inputs_time_s = load_start.elapsed().as_secs_f64();

    let mut options = config.cascade_options();
    if let Some(execution) = request.options.execution {
        options.execution = execution;
    }

    emit_progress(
        &mut progress_cb,
        RunStage::RunningCascade,
        started,
        Some(format!("Operating {} dams", inputs.reservoirs.len())),
    );

    let cascade_start = Instant::now();
    let outcome = run_cascade(
        &inputs.reservoirs,
        &inputs.rule_curves,
        inputs.field,
        &inputs.network,
        config.period(),
        &options,
    )?;
    timing.cascade_time_s = cascade_start.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        RunStage::SavingResults,
        started,
        Some("Writing run outputs".to_string()),
    );

    let save_start = Instant::now();
    let mut manifest = RunManifest {
        run_id: run_id.clone(),
        config_name: config.name.clone(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        engine_version: request.options.engine_version.clone(),
        period_start: config.period.start,
        period_end: config.period.end,
        dams: Vec::new(),
        clipped_values: 0,
    };
    manifest.summarize(&outcome);
    store.save_run(&manifest, &outcome)?;
    timing.save_time_s = save_start.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        run_id = %run_id,
        operated = outcome.operated().count(),
        skipped = outcome.skipped().count(),
        clipped = manifest.clipped_values,
        total_s = timing.total_time_s,
        "run complete"
    );

    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some("Run complete".to_string()),
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

fn store_for(config_path: &Path) -> AppResult<(RunStore, String)> {
    let config = load_config(config_path)?;
    let paths = config.resolve_paths(&config_base_dir(config_path));
    Ok((RunStore::for_config(&paths)?, config.name))
}

/// List all runs of a configuration, most recent first.
pub fn list_runs(config_path: &Path) -> AppResult<Vec<RunManifest>> {
    let (store, name) = store_for(config_path)?;

    let mut runs = store.list_runs(&name)?;
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(runs)
}

/// Load the manifest of a specific run.
pub fn load_run(config_path: &Path, run_id: &str) -> AppResult<RunManifest> {
    let (store, _) = store_for(config_path)?;
    Ok(store.load_manifest(run_id)?)
}

/// Load the flow change the run made, time-major in cfs.
pub fn load_delta(config_path: &Path, run_id: &str) -> AppResult<FlowFile> {
    let (store, _) = store_for(config_path)?;
    Ok(store.load_delta(run_id)?)
}

/// Load the storage and release series of one dam in a run.
pub fn load_dam_series(
    config_path: &Path,
    run_id: &str,
    dam: u32,
) -> AppResult<(DailySeries<Volume>, DailySeries<Flow>)> {
    let (store, _) = store_for(config_path)?;
    Ok((store.load_storage(run_id, dam)?, store.load_release(run_id, dam)?))
}

/// Copy a dam's storage file out of the run store to `dest`.
pub fn export_storage(config_path: &Path, run_id: &str, dam: u32, dest: &Path) -> AppResult<PathBuf> {
    let (store, _) = store_for(config_path)?;
    let source = store.storage_file(run_id, dam)?;
    std::fs::copy(&source, dest)?;
    Ok(dest.to_path_buf())
}
