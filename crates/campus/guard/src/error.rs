use campus_types::AccountId;
use thiserror::Error;

/// Rejections raised by the access guard before any module logic runs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardError {
    #[error("module is paused")]
    Paused,

    #[error("module is not paused")]
    NotPaused,

    #[error("account is locked: {0} is already executing in this module")]
    AccountLocked(AccountId),

    #[error("caller is not the owner: {0}")]
    OwnableUnauthorized(AccountId),

    #[error("invalid owner: {0}")]
    InvalidOwner(AccountId),
}
