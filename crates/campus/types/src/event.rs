//! Outcome events and per-call receipts.
//!
//! A mutating entry point that succeeds returns a [`Receipt`]: the ordered
//! list of events it produced. Some events are soft rejections of a single
//! batch item; the rest of the batch is still committed.

use crate::ids::{AccountId, CertificateId, ClassId, CourseId, GradeId};
use crate::score::Score;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four addressable campus modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleKind {
    Students,
    Teachers,
    Grades,
    Credentials,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 4] = [
        ModuleKind::Students,
        ModuleKind::Teachers,
        ModuleKind::Grades,
        ModuleKind::Credentials,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleKind::Students => "students",
            ModuleKind::Teachers => "teachers",
            ModuleKind::Grades => "grades",
            ModuleKind::Credentials => "credentials",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GuardEvent {
    Paused { by: AccountId },
    Unpaused { by: AccountId },
    OwnershipTransferred { previous: AccountId, new: AccountId },
    DirectoryLinked { directory: ModuleKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassEvent {
    Created(ClassId),
    Deleted(ClassId),
    AlreadyExists(ClassId),
    NotFound(ClassId),
}

impl ClassEvent {
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClassEvent::AlreadyExists(_) | ClassEvent::NotFound(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StudentEvent {
    Registered(AccountId),
    Deleted(AccountId),
    Updated(AccountId),
    AlreadyExists(AccountId),
    ZeroIdentity,
    NotFound(AccountId),
    NotEnrolledInClass { student: AccountId, class: ClassId },
    NoStudentsToDelete { class: ClassId },
}

impl StudentEvent {
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            StudentEvent::Registered(_) | StudentEvent::Deleted(_) | StudentEvent::Updated(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TeacherEvent {
    Registered(AccountId),
    Deleted(AccountId),
    Updated(AccountId),
    AlreadyExists(AccountId),
    ZeroIdentity,
    NotFound(AccountId),
}

impl TeacherEvent {
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            TeacherEvent::AlreadyExists(_) | TeacherEvent::ZeroIdentity | TeacherEvent::NotFound(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CourseEvent {
    Registered(CourseId),
    Deleted(CourseId),
    AlreadyExists(CourseId),
    NotFound(CourseId),
    NotOwned(CourseId),
    NoCoursesToDelete { teacher: AccountId },
}

impl CourseEvent {
    pub fn is_rejection(&self) -> bool {
        !matches!(self, CourseEvent::Registered(_) | CourseEvent::Deleted(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradeEvent {
    Added { student: AccountId, grade: GradeId },
    Deleted { student: AccountId, grade: GradeId },
    Updated { grade: GradeId, previous: Score, current: Score },
    ZeroIdentity,
    StudentNotFound(AccountId),
    AlreadyAssigned { student: AccountId, course: CourseId, module: u8 },
}

impl GradeEvent {
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GradeEvent::ZeroIdentity
                | GradeEvent::StudentNotFound(_)
                | GradeEvent::AlreadyAssigned { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CertificateEvent {
    Created(CertificateId),
    Updated(CertificateId),
}

/// Any outcome event produced by a campus module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Event {
    Guard(GuardEvent),
    Class(ClassEvent),
    Student(StudentEvent),
    Teacher(TeacherEvent),
    Course(CourseEvent),
    Grade(GradeEvent),
    Certificate(CertificateEvent),
}

impl Event {
    /// Whether this event reports a soft per-item failure.
    pub fn is_rejection(&self) -> bool {
        match self {
            Event::Guard(_) | Event::Certificate(_) => false,
            Event::Class(e) => e.is_rejection(),
            Event::Student(e) => e.is_rejection(),
            Event::Teacher(e) => e.is_rejection(),
            Event::Course(e) => e.is_rejection(),
            Event::Grade(e) => e.is_rejection(),
        }
    }
}

macro_rules! into_event {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Event {
                fn from(event: $ty) -> Self {
                    Event::$variant(event)
                }
            }

            impl From<$ty> for Receipt {
                fn from(event: $ty) -> Self {
                    Receipt::from(Event::$variant(event))
                }
            }
        )*
    };
}

into_event! {
    Guard => GuardEvent,
    Class => ClassEvent,
    Student => StudentEvent,
    Teacher => TeacherEvent,
    Course => CourseEvent,
    Grade => GradeEvent,
    Certificate => CertificateEvent,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Guard(GuardEvent::Paused { by }) => write!(f, "paused by {by}"),
            Event::Guard(GuardEvent::Unpaused { by }) => write!(f, "unpaused by {by}"),
            Event::Guard(GuardEvent::OwnershipTransferred { previous, new }) => {
                write!(f, "ownership transferred {previous} -> {new}")
            }
            Event::Guard(GuardEvent::DirectoryLinked { directory }) => {
                write!(f, "{directory} directory linked")
            }
            Event::Class(ClassEvent::Created(id)) => write!(f, "{id} created"),
            Event::Class(ClassEvent::Deleted(id)) => write!(f, "{id} deleted"),
            Event::Class(ClassEvent::AlreadyExists(id)) => write!(f, "{id} already exists"),
            Event::Class(ClassEvent::NotFound(id)) => write!(f, "{id} not found"),
            Event::Student(StudentEvent::Registered(id)) => write!(f, "student {id} registered"),
            Event::Student(StudentEvent::Deleted(id)) => write!(f, "student {id} deleted"),
            Event::Student(StudentEvent::Updated(id)) => write!(f, "student {id} updated"),
            Event::Student(StudentEvent::AlreadyExists(id)) => {
                write!(f, "student {id} already exists")
            }
            Event::Student(StudentEvent::ZeroIdentity) => f.write_str("zero student identity"),
            Event::Student(StudentEvent::NotFound(id)) => write!(f, "student {id} not found"),
            Event::Student(StudentEvent::NotEnrolledInClass { student, class }) => {
                write!(f, "student {student} not enrolled in {class}")
            }
            Event::Student(StudentEvent::NoStudentsToDelete { class }) => {
                write!(f, "{class} has no students to delete")
            }
            Event::Teacher(TeacherEvent::Registered(id)) => write!(f, "teacher {id} registered"),
            Event::Teacher(TeacherEvent::Deleted(id)) => write!(f, "teacher {id} deleted"),
            Event::Teacher(TeacherEvent::Updated(id)) => write!(f, "teacher {id} updated"),
            Event::Teacher(TeacherEvent::AlreadyExists(id)) => {
                write!(f, "teacher {id} already exists")
            }
            Event::Teacher(TeacherEvent::ZeroIdentity) => f.write_str("zero teacher identity"),
            Event::Teacher(TeacherEvent::NotFound(id)) => write!(f, "teacher {id} not found"),
            Event::Course(CourseEvent::Registered(id)) => write!(f, "{id} registered"),
            Event::Course(CourseEvent::Deleted(id)) => write!(f, "{id} deleted"),
            Event::Course(CourseEvent::AlreadyExists(id)) => write!(f, "{id} already exists"),
            Event::Course(CourseEvent::NotFound(id)) => write!(f, "{id} not found"),
            Event::Course(CourseEvent::NotOwned(id)) => write!(f, "{id} not owned by teacher"),
            Event::Course(CourseEvent::NoCoursesToDelete { teacher }) => {
                write!(f, "teacher {teacher} has no courses to delete")
            }
            Event::Grade(GradeEvent::Added { student, grade }) => {
                write!(f, "{grade} added for {student}")
            }
            Event::Grade(GradeEvent::Deleted { student, grade }) => {
                write!(f, "{grade} deleted for {student}")
            }
            Event::Grade(GradeEvent::Updated {
                grade,
                previous,
                current,
            }) => write!(f, "{grade} updated {previous} -> {current}"),
            Event::Grade(GradeEvent::ZeroIdentity) => f.write_str("zero student identity"),
            Event::Grade(GradeEvent::StudentNotFound(id)) => {
                write!(f, "student {id} not found")
            }
            Event::Grade(GradeEvent::AlreadyAssigned {
                student,
                course,
                module,
            }) => write!(f, "student {student} already graded in {course} module {module}"),
            Event::Certificate(CertificateEvent::Created(id)) => write!(f, "{id} minted"),
            Event::Certificate(CertificateEvent::Updated(id)) => write!(f, "{id} updated"),
        }
    }
}

/// Ordered outcome of one successful mutating call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    events: Vec<Event>,
}

impl Receipt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: impl Into<Event>) {
        self.events.push(event.into());
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, event: impl Into<Event>) -> bool {
        let event = event.into();
        self.events.contains(&event)
    }

    /// Soft per-item failures, in order
    pub fn rejections(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_rejection())
    }

    /// Accepted outcomes, in order
    pub fn accepted(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| !e.is_rejection())
    }

    /// True when no item of the call was rejected.
    pub fn is_clean(&self) -> bool {
        self.rejections().next().is_none()
    }
}

impl From<Event> for Receipt {
    fn from(event: Event) -> Self {
        Self {
            events: vec![event],
        }
    }
}

impl IntoIterator for Receipt {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(n: u64) -> AccountId {
        AccountId::from_low_u64(n)
    }

    #[test]
    fn test_rejection_classification() {
        assert!(!Event::from(ClassEvent::Created(ClassId(1))).is_rejection());
        assert!(Event::from(ClassEvent::AlreadyExists(ClassId(1))).is_rejection());
        assert!(Event::from(StudentEvent::NoStudentsToDelete { class: ClassId(1) }).is_rejection());
        assert!(!Event::from(StudentEvent::Updated(account(1))).is_rejection());
        assert!(Event::from(CourseEvent::NotOwned(CourseId(10))).is_rejection());
        assert!(Event::from(CourseEvent::NoCoursesToDelete { teacher: account(2) }).is_rejection());
        assert!(Event::from(GradeEvent::ZeroIdentity).is_rejection());
        assert!(!Event::from(GradeEvent::Added {
            student: account(1),
            grade: GradeId(0)
        })
        .is_rejection());
        assert!(Event::from(GradeEvent::AlreadyAssigned {
            student: account(1),
            course: CourseId(10),
            module: 1,
        })
        .is_rejection());
        assert!(!Event::from(GuardEvent::Paused { by: account(9) }).is_rejection());
        assert!(!Event::from(CertificateEvent::Created(CertificateId(0))).is_rejection());
    }

    #[test]
    fn test_receipt_partitions_events() {
        let mut receipt = Receipt::new();
        receipt.push(ClassEvent::Created(ClassId(1)));
        receipt.push(ClassEvent::AlreadyExists(ClassId(2)));
        receipt.push(ClassEvent::Created(ClassId(3)));

        assert_eq!(receipt.len(), 3);
        assert!(!receipt.is_clean());
        assert_eq!(receipt.accepted().count(), 2);
        let rejected: Vec<_> = receipt.rejections().copied().collect();
        assert_eq!(rejected, vec![Event::Class(ClassEvent::AlreadyExists(ClassId(2)))]);
        assert!(receipt.contains(ClassEvent::Created(ClassId(3))));
    }

    #[test]
    fn test_receipt_json_shape() {
        let receipt = Receipt::from(StudentEvent::NotEnrolledInClass {
            student: account(1),
            class: ClassId(2),
        });
        let json = serde_json::to_value(&receipt).unwrap();
        let event = &json["events"][0]["student"]["notEnrolledInClass"];
        assert_eq!(event["class"], 2);
        assert_eq!(event["student"], account(1).to_string());
    }

    #[test]
    fn test_module_names() {
        let names: Vec<_> = ModuleKind::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, ["students", "teachers", "grades", "credentials"]);
        assert_eq!(
            serde_json::from_str::<ModuleKind>("\"credentials\"").unwrap(),
            ModuleKind::Credentials
        );
    }
}
