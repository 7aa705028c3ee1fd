use campus_guard::GuardError;
use campus_types::{AccountId, CourseId, GradeId};
use thiserror::Error;

/// Errors from the grade ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GradingError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("unauthorized caller: {0}")]
    Unauthorized(AccountId),

    #[error("no students provided")]
    NoStudentsProvided,

    #[error("no grades provided")]
    NoGradesProvided,

    #[error("students and grades differ in length: {students} students, {grades} grades")]
    StudentsGradesLengthMismatch { students: usize, grades: usize },

    #[error("course not found: {0}")]
    CourseNotFound(CourseId),

    #[error("module {module} is out of range for {course}")]
    ModuleOutOfRange { course: CourseId, module: u8 },

    #[error("invalid score: {0}")]
    InvalidScore(u8),

    #[error("grade not found: {0}")]
    GradeNotFound(GradeId),

    #[error("zero identity")]
    ZeroIdentity,
}

pub type Result<T> = std::result::Result<T, GradingError>;
