//! Shared application service layer for regflow.
//!
//! Centralizes configuration loading, run execution with caching, and result
//! queries so that front ends only handle presentation.

pub mod config_service;
pub mod error;
pub mod progress;
pub mod query;
pub mod run_service;

// Re-export key types for convenience
pub use config_service::{ValidationReport, config_base_dir, load_config, validate_run};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage};
pub use query::{RunSummary, StorageStats, changed_cells, get_run_summary, storage_stats};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, ensure_run, ensure_run_with_progress,
    export_storage, list_runs, load_dam_series, load_delta, load_run,
};
pub use rf_results::{DamStatus, RunManifest};
