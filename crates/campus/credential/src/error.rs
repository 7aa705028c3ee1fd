use campus_guard::GuardError;
use campus_types::{AccountId, CertificateId, CourseId, GradeId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("unauthorized caller: {0}")]
    Unauthorized(AccountId),

    #[error("zero identity")]
    ZeroIdentity,

    #[error("course not found: {0}")]
    CourseNotFound(CourseId),

    #[error("grade not found: {0}")]
    GradeNotFound(GradeId),

    #[error("{grade} is not recorded under {course}")]
    GradeCourseMismatch { grade: GradeId, course: CourseId },

    #[error("certificate not found: {0}")]
    CertificateNotFound(CertificateId),
}

pub type Result<T> = std::result::Result<T, CredentialError>;
