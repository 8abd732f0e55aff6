//! Error types for the rf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates behind
/// one interface for front ends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cascade error: {0}")]
    Cascade(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rf-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<rf_project::ProjectError> for AppError {
    fn from(err: rf_project::ProjectError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<rf_cascade::CascadeError> for AppError {
    fn from(err: rf_cascade::CascadeError) -> Self {
        AppError::Cascade(err.to_string())
    }
}

impl From<rf_results::ResultsError> for AppError {
    fn from(err: rf_results::ResultsError) -> Self {
        match err {
            rf_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            rf_results::ResultsError::InvalidRunId { run_id } => {
                AppError::InvalidInput(format!("Not a run id: {:?}", run_id))
            }
            other => AppError::Results(other.to_string()),
        }
    }
}
