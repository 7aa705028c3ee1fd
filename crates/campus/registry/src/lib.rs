//! Campus Registry - classes, students, teachers and courses
//!
//! Two registries that consult each other through late-bound weak
//! directory handles:
//! - [`ClassStudentRegistry`]: classes and enrolled students
//! - [`TeacherCourseRegistry`]: teachers and the courses they own
#![deny(unsafe_code)]

pub mod class_student;
pub mod error;
pub mod teacher_course;

pub use class_student::ClassStudentRegistry;
pub use error::{RegistryError, Result};
pub use teacher_course::TeacherCourseRegistry;
