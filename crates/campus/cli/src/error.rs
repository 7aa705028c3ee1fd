//! CLI error types

use campus_runtime::CampusError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Deployment or request failure
    #[error(transparent)]
    Campus(#[from] CampusError),

    /// Script could not be read or parsed
    #[error("Invalid script {path}: {message}")]
    Script { path: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
