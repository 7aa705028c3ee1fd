//! Registry error types

use campus_guard::GuardError;
use campus_types::{AccountId, ClassId, CourseId};
use thiserror::Error;

/// Hard aborts of a registry entry point. A returned error means nothing
/// was written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("unauthorized caller: {0}")]
    Unauthorized(AccountId),

    #[error("no classes provided")]
    NoClassesProvided,

    #[error("no classes to delete")]
    NoClassesToDelete,

    #[error("class not found: {0}")]
    ClassNotFound(ClassId),

    #[error("no students provided")]
    NoStudentsProvided,

    #[error("no students to delete in {0}")]
    NoStudentsToDelete(ClassId),

    #[error("zero identity")]
    ZeroIdentity,

    #[error("student not found: {0}")]
    StudentNotFound(AccountId),

    #[error("student {student} is not enrolled in {class}")]
    NotEnrolledInClass { student: AccountId, class: ClassId },

    #[error("teacher directory is not linked")]
    TeacherDirectoryUnavailable,

    #[error("student directory is not linked")]
    StudentDirectoryUnavailable,

    #[error("no teachers provided")]
    NoTeachersProvided,

    #[error("no teachers to delete")]
    NoTeachersToDelete,

    #[error("teachers and classes differ in length: {teachers} teachers, {classes} classes")]
    TeachersClassesLengthMismatch { teachers: usize, classes: usize },

    #[error("teacher not found: {0}")]
    TeacherNotFound(AccountId),

    #[error("no courses provided")]
    NoCoursesProvided,

    #[error("no modules provided")]
    NoModulesProvided,

    #[error(
        "courses, classes and modules differ in length: {courses} courses, {classes} classes, {modules} modules"
    )]
    CoursesClassesModulesLengthMismatch {
        courses: usize,
        classes: usize,
        modules: usize,
    },

    #[error("invalid module count for {course}: must be at least 1")]
    InvalidModuleCount { course: CourseId },
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
