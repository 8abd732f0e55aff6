//! rf-results: run cache and per-dam output files.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::compute_run_id;
pub use store::{RunStore, is_run_id};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Not a run id: {run_id:?}")]
    InvalidRunId { run_id: String },

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("No output for dam {dam} in run {run_id}")]
    DamNotFound { run_id: String, dam: u32 },

    #[error("Corrupt output {file}: {what}")]
    Corrupt { file: String, what: String },
}
