//! Campus Types - shared vocabulary of the campus registry
//!
//! Identities, registry records, the score scale, outcome events and the
//! directory capabilities modules use to consult each other.
#![deny(unsafe_code)]

pub mod directory;
pub mod entity;
pub mod event;
pub mod ids;
pub mod role;
pub mod score;

pub use directory::{GradeDirectory, StudentDirectory, TeacherDirectory};
pub use entity::{Certificate, Class, Course, Grade, Student, Teacher};
pub use event::{
    CertificateEvent, ClassEvent, CourseEvent, Event, GradeEvent, GuardEvent, ModuleKind, Receipt,
    StudentEvent, TeacherEvent,
};
pub use ids::{AccountId, CertificateId, ClassId, CourseId, GradeId, ParseAccountIdError};
pub use role::Role;
pub use score::{LetterGrade, Score, ScoreError, MAX_SCORE};
