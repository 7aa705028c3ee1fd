//! Narrow read-only capabilities that modules expose to each other.
//!
//! A module never holds another module's concrete type; it holds one of
//! these traits and re-derives whatever it needs on every call.

use crate::entity::Course;
use crate::ids::{AccountId, ClassId, CourseId, GradeId};
use crate::role::Role;

/// Existence checks over classes and students
pub trait StudentDirectory: Send + Sync {
    fn is_known_student(&self, id: &AccountId) -> bool;

    fn is_known_class(&self, class: ClassId) -> bool;
}

/// Existence checks over teachers and courses
pub trait TeacherDirectory: Send + Sync {
    fn is_known_teacher(&self, id: &AccountId) -> bool;

    fn is_known_course(&self, course: CourseId) -> bool;

    /// Snapshot of a registered course
    fn course(&self, course: CourseId) -> Option<Course>;
}

/// Existence checks over grades plus role resolution
pub trait GradeDirectory: Send + Sync {
    fn grade_exists(&self, grade: GradeId) -> bool;

    /// Course a recorded grade belongs to
    fn grade_course(&self, grade: GradeId) -> Option<CourseId>;

    fn role_of(&self, id: &AccountId) -> Role;
}
