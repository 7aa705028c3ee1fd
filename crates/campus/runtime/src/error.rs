//! Runtime error types

use campus_credential::CredentialError;
use campus_grading::GradingError;
use campus_guard::GuardError;
use campus_registry::RegistryError;
use campus_types::{AccountId, ModuleKind};
use thiserror::Error;

/// Errors surfaced by [`Campus`](crate::Campus).
#[derive(Debug, Error)]
pub enum CampusError {
    #[error("invalid call: {module}.{entry}")]
    InvalidCall { module: ModuleKind, entry: String },

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Grading(#[from] GradingError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("no owner configured")]
    MissingOwner,

    #[error("invalid owner: {0}")]
    InvalidOwner(AccountId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CampusError {
    /// Module-level guard rejection, whichever module raised it.
    pub fn guard_error(&self) -> Option<GuardError> {
        match self {
            CampusError::Guard(e)
            | CampusError::Registry(RegistryError::Guard(e))
            | CampusError::Grading(GradingError::Guard(e))
            | CampusError::Credential(CredentialError::Guard(e)) => Some(*e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CampusError>;
