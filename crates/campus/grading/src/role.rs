//! Role resolution from a bare identity.

use campus_types::{AccountId, Role, StudentDirectory, TeacherDirectory};

/// Resolve the role of `id` in priority order: owner, live teacher, live
/// student. Anything else is `Unauthorized`, including the zero identity
/// when the owner has been renounced.
pub fn resolve_role(
    owner: &AccountId,
    students: &dyn StudentDirectory,
    teachers: &dyn TeacherDirectory,
    id: &AccountId,
) -> Role {
    if id.is_zero() {
        return Role::Unauthorized;
    }
    if id == owner {
        Role::Admin
    } else if teachers.is_known_teacher(id) {
        Role::Teacher
    } else if students.is_known_student(id) {
        Role::Student
    } else {
        Role::Unauthorized
    }
}
