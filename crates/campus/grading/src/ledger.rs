//! Grade ledger.
//!
//! Records one grade per (course, module, student) slot. Students and
//! courses are owned elsewhere; the ledger consults them through directory
//! handles on every call and never caches what it learns.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use campus_guard::{AccessGuard, Guarded};
use campus_types::{
    AccountId, Course, CourseId, Grade, GradeDirectory, GradeEvent, GradeId, GuardEvent,
    ModuleKind, Receipt, Role, Score, StudentDirectory, TeacherDirectory,
};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::{GradingError, Result};
use crate::role::resolve_role;

type Slot = (CourseId, u8, AccountId);

#[derive(Debug, Default)]
struct GradeState {
    grades: BTreeMap<GradeId, Grade>,
    by_student: HashMap<AccountId, Vec<GradeId>>,
    slots: HashSet<Slot>,
    next_id: u64,
}

/// Outcome of one `add_grades` row, decided before anything is written
enum Row {
    Zero,
    Unknown(AccountId),
    Taken(AccountId),
    Commit(AccountId, Score),
}

impl GradeState {
    fn allocate(&mut self) -> GradeId {
        let id = GradeId(self.next_id);
        self.next_id += 1;
        id
    }
}

struct Directories {
    students: Arc<dyn StudentDirectory>,
    teachers: Arc<dyn TeacherDirectory>,
}

pub struct GradeLedger {
    guard: AccessGuard,
    state: RwLock<GradeState>,
    directories: RwLock<Directories>,
}

impl GradeLedger {
    pub fn new(
        owner: AccountId,
        students: Arc<dyn StudentDirectory>,
        teachers: Arc<dyn TeacherDirectory>,
    ) -> Self {
        Self {
            guard: AccessGuard::new(ModuleKind::Grades, owner),
            state: RwLock::new(GradeState::default()),
            directories: RwLock::new(Directories { students, teachers }),
        }
    }

    fn students(&self) -> Arc<dyn StudentDirectory> {
        self.directories.read().students.clone()
    }

    fn teachers(&self) -> Arc<dyn TeacherDirectory> {
        self.directories.read().teachers.clone()
    }

    pub fn link_directories(
        &self,
        caller: &AccountId,
        students: Arc<dyn StudentDirectory>,
        teachers: Arc<dyn TeacherDirectory>,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        *self.directories.write() = Directories { students, teachers };
        info!(caller = %caller, "Grade ledger directories linked");

        let mut receipt = Receipt::new();
        receipt.push(GuardEvent::DirectoryLinked {
            directory: ModuleKind::Students,
        });
        receipt.push(GuardEvent::DirectoryLinked {
            directory: ModuleKind::Teachers,
        });
        Ok(receipt)
    }

    /// Role of `id`: owner, then live teacher, then live student.
    pub fn role_of(&self, id: &AccountId) -> Role {
        let students = self.students();
        let teachers = self.teachers();
        resolve_role(&self.guard.owner(), &*students, &*teachers, id)
    }

    fn ensure_staff(&self, caller: &AccountId) -> Result<Role> {
        let role = self.role_of(caller);
        if role.is_staff() {
            Ok(role)
        } else {
            Err(GradingError::Unauthorized(*caller))
        }
    }

    fn course(&self, course: CourseId) -> Result<Course> {
        self.teachers()
            .course(course)
            .ok_or(GradingError::CourseNotFound(course))
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Records one grade per listed student for `course`/`module`.
    ///
    /// Zero or unknown students, and students whose slot is already graded,
    /// are skipped with a rejection event. Scores are checked only for rows
    /// that would be written. Every other failure aborts the whole batch
    /// before anything is written.
    pub fn add_grades(
        &self,
        caller: &AccountId,
        students: &[AccountId],
        scores: &[u8],
        course: CourseId,
        module: u8,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter(caller)?;
        self.ensure_staff(caller)?;
        if students.is_empty() {
            return Err(GradingError::NoStudentsProvided);
        }
        if scores.is_empty() {
            return Err(GradingError::NoGradesProvided);
        }
        if students.len() != scores.len() {
            return Err(GradingError::StudentsGradesLengthMismatch {
                students: students.len(),
                grades: scores.len(),
            });
        }
        let record = self.course(course)?;
        if !record.has_module(module) {
            return Err(GradingError::ModuleOutOfRange { course, module });
        }

        let directory = self.students();
        let known: Vec<bool> = students
            .iter()
            .map(|s| !s.is_zero() && directory.is_known_student(s))
            .collect();

        let mut state = self.state.write();
        let mut filled = HashSet::new();
        let mut rows = Vec::with_capacity(students.len());
        for ((student, value), known) in students.iter().zip(scores).zip(known) {
            let row = if student.is_zero() {
                Row::Zero
            } else if !known {
                Row::Unknown(*student)
            } else if state.slots.contains(&(course, module, *student))
                || !filled.insert(*student)
            {
                Row::Taken(*student)
            } else {
                let score =
                    Score::assigned(*value).map_err(|_| GradingError::InvalidScore(*value))?;
                Row::Commit(*student, score)
            };
            rows.push(row);
        }

        let mut receipt = Receipt::new();
        for row in rows {
            let (student, score) = match row {
                Row::Zero => {
                    warn!(course = %course, module, "Zero identity in grade batch");
                    receipt.push(GradeEvent::ZeroIdentity);
                    continue;
                }
                Row::Unknown(student) => {
                    warn!(student = %student, course = %course, "Student not found");
                    receipt.push(GradeEvent::StudentNotFound(student));
                    continue;
                }
                Row::Taken(student) => {
                    warn!(student = %student, course = %course, module, "Grade already assigned");
                    receipt.push(GradeEvent::AlreadyAssigned {
                        student,
                        course,
                        module,
                    });
                    continue;
                }
                Row::Commit(student, score) => (student, score),
            };

            let id = state.allocate();
            state.grades.insert(
                id,
                Grade {
                    id,
                    student,
                    teacher: record.teacher,
                    course,
                    module,
                    score,
                },
            );
            state.by_student.entry(student).or_default().push(id);
            state.slots.insert((course, module, student));

            info!(
                grade = %id,
                student = %student,
                course = %course,
                module,
                score = score.value(),
                "Grade added"
            );
            receipt.push(GradeEvent::Added { student, grade: id });
        }
        Ok(receipt)
    }

    /// Removes a grade and frees its slot.
    pub fn delete_grade(&self, caller: &AccountId, id: GradeId) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;

        let mut state = self.state.write();
        let grade = state
            .grades
            .remove(&id)
            .ok_or(GradingError::GradeNotFound(id))?;
        if let Some(ids) = state.by_student.get_mut(&grade.student) {
            ids.retain(|g| *g != id);
        }
        state
            .slots
            .remove(&(grade.course, grade.module, grade.student));

        info!(grade = %id, student = %grade.student, "Grade deleted");
        Ok(GradeEvent::Deleted {
            student: grade.student,
            grade: id,
        }
        .into())
    }

    /// Replaces the score of an existing grade.
    ///
    /// The target's course is resolved first. A missing grade resolves to
    /// course 0, so it reports `CourseNotFound(course:0)` unless a course 0
    /// happens to exist.
    pub fn update_grade(&self, caller: &AccountId, id: GradeId, score: u8) -> Result<Receipt> {
        let _lock = self.guard.enter(caller)?;
        self.ensure_staff(caller)?;
        let current = Score::assigned(score).map_err(|_| GradingError::InvalidScore(score))?;

        let course = self.grade_course(id).unwrap_or(CourseId(0));
        if !self.teachers().is_known_course(course) {
            return Err(GradingError::CourseNotFound(course));
        }

        let mut state = self.state.write();
        let grade = state
            .grades
            .get_mut(&id)
            .ok_or(GradingError::GradeNotFound(id))?;
        let previous = std::mem::replace(&mut grade.score, current);

        info!(
            grade = %id,
            previous = previous.value(),
            current = current.value(),
            by = %caller,
            "Grade updated"
        );
        Ok(GradeEvent::Updated {
            grade: id,
            previous,
            current,
        }
        .into())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// A grade, visible to the owner, its teacher and its student.
    pub fn grade(&self, caller: &AccountId, id: GradeId) -> Result<Grade> {
        let role = self.role_of(caller);
        if role == Role::Unauthorized {
            return Err(GradingError::Unauthorized(*caller));
        }
        let grade = self
            .state
            .read()
            .grades
            .get(&id)
            .copied()
            .ok_or(GradingError::GradeNotFound(id))?;
        if role == Role::Admin || grade.teacher == *caller || grade.student == *caller {
            Ok(grade)
        } else {
            Err(GradingError::Unauthorized(*caller))
        }
    }

    fn ensure_can_view_student(&self, caller: &AccountId, student: &AccountId) -> Result<()> {
        if student.is_zero() {
            return Err(GradingError::ZeroIdentity);
        }
        if self.role_of(caller).is_staff() || caller == student {
            Ok(())
        } else {
            Err(GradingError::Unauthorized(*caller))
        }
    }

    /// Grade ids of a student in recording order.
    pub fn grades_by_student(&self, caller: &AccountId, student: &AccountId) -> Result<Vec<GradeId>> {
        self.ensure_can_view_student(caller, student)?;
        Ok(self
            .state
            .read()
            .by_student
            .get(student)
            .cloned()
            .unwrap_or_default())
    }

    pub fn total_grades_by_student(&self, caller: &AccountId, student: &AccountId) -> Result<usize> {
        self.ensure_can_view_student(caller, student)?;
        Ok(self
            .state
            .read()
            .by_student
            .get(student)
            .map_or(0, Vec::len))
    }

    pub fn grade_exists(&self, id: GradeId) -> bool {
        self.state.read().grades.contains_key(&id)
    }

    pub fn grade_course(&self, id: GradeId) -> Option<CourseId> {
        self.state.read().grades.get(&id).map(|g| g.course)
    }

    pub fn total_grades(&self) -> usize {
        self.state.read().grades.len()
    }
}

impl Guarded for GradeLedger {
    fn guard(&self) -> &AccessGuard {
        &self.guard
    }
}

impl GradeDirectory for GradeLedger {
    fn grade_exists(&self, grade: GradeId) -> bool {
        GradeLedger::grade_exists(self, grade)
    }

    fn grade_course(&self, grade: GradeId) -> Option<CourseId> {
        GradeLedger::grade_course(self, grade)
    }

    fn role_of(&self, id: &AccountId) -> Role {
        GradeLedger::role_of(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_guard::GuardError;
    use campus_registry::{ClassStudentRegistry, TeacherCourseRegistry};
    use campus_types::{ClassId, Event};

    fn account(n: u64) -> AccountId {
        AccountId::from_low_u64(n)
    }

    fn owner() -> AccountId {
        account(1)
    }

    fn teacher() -> AccountId {
        account(20)
    }

    fn student_a() -> AccountId {
        account(30)
    }

    fn student_b() -> AccountId {
        account(31)
    }

    struct Fixture {
        students: Arc<ClassStudentRegistry>,
        teachers: Arc<TeacherCourseRegistry>,
        ledger: GradeLedger,
    }

    fn fixture() -> Fixture {
        let students = Arc::new(ClassStudentRegistry::new(owner()));
        let teachers = Arc::new(TeacherCourseRegistry::new(owner()));
        students.add_classes(&owner(), &[ClassId(1)]).unwrap();
        students
            .register_students(&owner(), &[student_a(), student_b()], ClassId(1))
            .unwrap();
        teachers
            .register_teachers(&owner(), &[teacher()], &[ClassId(1)])
            .unwrap();
        teachers
            .register_course(&teacher(), teacher(), &[CourseId(10)], &[ClassId(1)], &[5])
            .unwrap();

        let ledger = GradeLedger::new(owner(), students.clone(), teachers.clone());
        Fixture {
            students,
            teachers,
            ledger,
        }
    }

    #[test]
    fn test_role_resolution() {
        let f = fixture();
        assert_eq!(f.ledger.role_of(&owner()), Role::Admin);
        assert_eq!(f.ledger.role_of(&teacher()), Role::Teacher);
        assert_eq!(f.ledger.role_of(&student_a()), Role::Student);
        assert_eq!(f.ledger.role_of(&account(99)), Role::Unauthorized);

        f.teachers.delete_teachers(&owner(), &[teacher()]).unwrap();
        assert_eq!(f.ledger.role_of(&teacher()), Role::Unauthorized);
    }

    #[test]
    fn test_add_grades_partial_success() {
        let f = fixture();
        let receipt = f
            .ledger
            .add_grades(
                &teacher(),
                &[student_a(), AccountId::ZERO],
                &[5, 4],
                CourseId(10),
                1,
            )
            .unwrap();

        assert_eq!(
            receipt.events(),
            &[
                Event::Grade(GradeEvent::Added {
                    student: student_a(),
                    grade: GradeId(0)
                }),
                Event::Grade(GradeEvent::ZeroIdentity),
            ]
        );
        assert_eq!(f.ledger.total_grades(), 1);

        let grade = f.ledger.grade(&student_a(), GradeId(0)).unwrap();
        assert_eq!(grade.teacher, teacher());
        assert_eq!(grade.score.value(), 5);
        assert_eq!(grade.module, 1);
    }

    #[test]
    fn test_add_grades_unknown_student_is_soft() {
        let f = fixture();
        let receipt = f
            .ledger
            .add_grades(&owner(), &[account(77), student_b()], &[3, 6], CourseId(10), 2)
            .unwrap();
        assert!(receipt.contains(GradeEvent::StudentNotFound(account(77))));
        assert!(receipt.contains(GradeEvent::Added {
            student: student_b(),
            grade: GradeId(0)
        }));
    }

    #[test]
    fn test_add_grades_hard_failures_write_nothing() {
        let f = fixture();
        let cases: Vec<(Vec<AccountId>, Vec<u8>, CourseId, u8, GradingError)> = vec![
            (vec![], vec![5], CourseId(10), 1, GradingError::NoStudentsProvided),
            (vec![student_a()], vec![], CourseId(10), 1, GradingError::NoGradesProvided),
            (
                vec![student_a(), student_b()],
                vec![5],
                CourseId(10),
                1,
                GradingError::StudentsGradesLengthMismatch {
                    students: 2,
                    grades: 1,
                },
            ),
            (vec![student_a()], vec![5], CourseId(99), 1, GradingError::CourseNotFound(CourseId(99))),
            (
                vec![student_a()],
                vec![5],
                CourseId(10),
                6,
                GradingError::ModuleOutOfRange {
                    course: CourseId(10),
                    module: 6,
                },
            ),
            (
                vec![student_a()],
                vec![5],
                CourseId(10),
                0,
                GradingError::ModuleOutOfRange {
                    course: CourseId(10),
                    module: 0,
                },
            ),
            (vec![student_a(), student_b()], vec![5, 7], CourseId(10), 1, GradingError::InvalidScore(7)),
            (vec![student_a()], vec![0], CourseId(10), 1, GradingError::InvalidScore(0)),
        ];

        for (students, scores, course, module, expected) in cases {
            let err = f
                .ledger
                .add_grades(&teacher(), &students, &scores, course, module)
                .unwrap_err();
            assert_eq!(err, expected);
        }
        assert_eq!(f.ledger.total_grades(), 0);
    }

    #[test]
    fn test_resubmitted_batch_grades_only_new_students() {
        let f = fixture();
        f.ledger
            .add_grades(&teacher(), &[student_a()], &[4], CourseId(10), 1)
            .unwrap();

        let receipt = f
            .ledger
            .add_grades(&teacher(), &[student_a(), student_b()], &[5, 4], CourseId(10), 1)
            .unwrap();
        assert_eq!(
            receipt.events(),
            &[
                Event::Grade(GradeEvent::AlreadyAssigned {
                    student: student_a(),
                    course: CourseId(10),
                    module: 1,
                }),
                Event::Grade(GradeEvent::Added {
                    student: student_b(),
                    grade: GradeId(1),
                }),
            ]
        );
        assert_eq!(receipt.rejections().count(), 1);
        assert_eq!(
            f.ledger.total_grades_by_student(&owner(), &student_b()).unwrap(),
            1
        );
        // The existing grade keeps its score.
        assert_eq!(f.ledger.grade(&owner(), GradeId(0)).unwrap().score.value(), 4);
    }

    #[test]
    fn test_repeated_rows_in_one_batch() {
        let f = fixture();
        let receipt = f
            .ledger
            .add_grades(
                &teacher(),
                &[student_a(), student_a(), account(77), account(77)],
                &[5, 3, 2, 2],
                CourseId(10),
                1,
            )
            .unwrap();
        assert_eq!(
            receipt.events(),
            &[
                Event::Grade(GradeEvent::Added {
                    student: student_a(),
                    grade: GradeId(0),
                }),
                Event::Grade(GradeEvent::AlreadyAssigned {
                    student: student_a(),
                    course: CourseId(10),
                    module: 1,
                }),
                Event::Grade(GradeEvent::StudentNotFound(account(77))),
                Event::Grade(GradeEvent::StudentNotFound(account(77))),
            ]
        );
        assert_eq!(f.ledger.total_grades(), 1);
        assert_eq!(f.ledger.grade(&owner(), GradeId(0)).unwrap().score.value(), 5);
    }

    #[test]
    fn test_scores_checked_only_for_written_rows() {
        let f = fixture();
        let receipt = f
            .ledger
            .add_grades(
                &teacher(),
                &[student_a(), AccountId::ZERO, account(77)],
                &[5, 0, 9],
                CourseId(10),
                1,
            )
            .unwrap();
        assert_eq!(receipt.accepted().count(), 1);
        assert_eq!(receipt.rejections().count(), 2);

        // A bad score on a row that would be written still aborts everything.
        assert_eq!(
            f.ledger
                .add_grades(&teacher(), &[student_b(), student_a()], &[0, 5], CourseId(10), 2)
                .unwrap_err(),
            GradingError::InvalidScore(0)
        );
        assert_eq!(f.ledger.total_grades(), 1);
    }

    #[test]
    fn test_slot_is_free_again_after_delete() {
        let f = fixture();
        f.ledger
            .add_grades(&teacher(), &[student_a()], &[4], CourseId(10), 1)
            .unwrap();

        let receipt = f.ledger.delete_grade(&owner(), GradeId(0)).unwrap();
        assert!(receipt.contains(GradeEvent::Deleted {
            student: student_a(),
            grade: GradeId(0)
        }));

        let receipt = f
            .ledger
            .add_grades(&teacher(), &[student_a()], &[6], CourseId(10), 1)
            .unwrap();
        // Ids keep growing after a delete.
        assert!(receipt.contains(GradeEvent::Added {
            student: student_a(),
            grade: GradeId(1)
        }));
    }

    #[test]
    fn test_add_grades_requires_staff() {
        let f = fixture();
        assert_eq!(
            f.ledger
                .add_grades(&student_a(), &[student_b()], &[5], CourseId(10), 1)
                .unwrap_err(),
            GradingError::Unauthorized(student_a())
        );
    }

    #[test]
    fn test_delete_grade_owner_only() {
        let f = fixture();
        f.ledger
            .add_grades(&teacher(), &[student_a()], &[4], CourseId(10), 1)
            .unwrap();
        assert_eq!(
            f.ledger.delete_grade(&teacher(), GradeId(0)).unwrap_err(),
            GradingError::Guard(GuardError::OwnableUnauthorized(teacher()))
        );
        assert_eq!(
            f.ledger.delete_grade(&owner(), GradeId(5)).unwrap_err(),
            GradingError::GradeNotFound(GradeId(5))
        );
        f.ledger.delete_grade(&owner(), GradeId(0)).unwrap();
        assert_eq!(
            f.ledger.total_grades_by_student(&owner(), &student_a()).unwrap(),
            0
        );
    }

    #[test]
    fn test_update_grade() {
        let f = fixture();
        f.ledger
            .add_grades(&teacher(), &[student_a()], &[4], CourseId(10), 1)
            .unwrap();

        let receipt = f.ledger.update_grade(&teacher(), GradeId(0), 6).unwrap();
        assert_eq!(
            receipt.events(),
            &[Event::Grade(GradeEvent::Updated {
                grade: GradeId(0),
                previous: Score::assigned(4).unwrap(),
                current: Score::assigned(6).unwrap(),
            })]
        );
        assert_eq!(f.ledger.grade(&owner(), GradeId(0)).unwrap().score.value(), 6);

        assert_eq!(
            f.ledger.update_grade(&student_a(), GradeId(0), 6).unwrap_err(),
            GradingError::Unauthorized(student_a())
        );
        assert_eq!(
            f.ledger.update_grade(&teacher(), GradeId(0), 9).unwrap_err(),
            GradingError::InvalidScore(9)
        );
    }

    #[test]
    fn test_update_missing_grade_reports_course_zero() {
        let f = fixture();
        assert_eq!(
            f.ledger.update_grade(&teacher(), GradeId(3), 6).unwrap_err(),
            GradingError::CourseNotFound(CourseId(0))
        );

        f.teachers
            .register_course(&owner(), teacher(), &[CourseId(0)], &[ClassId(1)], &[1])
            .unwrap();
        assert_eq!(
            f.ledger.update_grade(&teacher(), GradeId(3), 6).unwrap_err(),
            GradingError::GradeNotFound(GradeId(3))
        );
    }

    #[test]
    fn test_update_grade_after_course_deleted() {
        let f = fixture();
        f.ledger
            .add_grades(&teacher(), &[student_a()], &[4], CourseId(10), 1)
            .unwrap();
        f.teachers
            .delete_courses(&teacher(), &[CourseId(10)], teacher())
            .unwrap();
        assert_eq!(
            f.ledger.update_grade(&teacher(), GradeId(0), 5).unwrap_err(),
            GradingError::CourseNotFound(CourseId(10))
        );
    }

    #[test]
    fn test_grade_visibility() {
        let f = fixture();
        f.ledger
            .add_grades(&teacher(), &[student_a()], &[4], CourseId(10), 1)
            .unwrap();

        assert!(f.ledger.grade(&owner(), GradeId(0)).is_ok());
        assert!(f.ledger.grade(&teacher(), GradeId(0)).is_ok());
        assert!(f.ledger.grade(&student_a(), GradeId(0)).is_ok());
        assert_eq!(
            f.ledger.grade(&student_b(), GradeId(0)).unwrap_err(),
            GradingError::Unauthorized(student_b())
        );
        assert_eq!(
            f.ledger.grade(&account(99), GradeId(0)).unwrap_err(),
            GradingError::Unauthorized(account(99))
        );
        assert_eq!(
            f.ledger.grade(&owner(), GradeId(1)).unwrap_err(),
            GradingError::GradeNotFound(GradeId(1))
        );
    }

    #[test]
    fn test_grades_by_student_visibility() {
        let f = fixture();
        f.ledger
            .add_grades(&teacher(), &[student_a()], &[4], CourseId(10), 1)
            .unwrap();

        assert_eq!(
            f.ledger.grades_by_student(&student_a(), &student_a()).unwrap(),
            vec![GradeId(0)]
        );
        assert_eq!(
            f.ledger.total_grades_by_student(&teacher(), &student_a()).unwrap(),
            1
        );
        assert_eq!(
            f.ledger
                .grades_by_student(&student_b(), &student_a())
                .unwrap_err(),
            GradingError::Unauthorized(student_b())
        );
        assert_eq!(
            f.ledger
                .total_grades_by_student(&owner(), &AccountId::ZERO)
                .unwrap_err(),
            GradingError::ZeroIdentity
        );
    }

    #[test]
    fn test_directory_relink_is_owner_only() {
        let f = fixture();
        let students: Arc<dyn StudentDirectory> = f.students.clone();
        let teachers: Arc<dyn TeacherDirectory> = f.teachers.clone();
        assert_eq!(
            f.ledger
                .link_directories(&teacher(), students.clone(), teachers.clone())
                .unwrap_err(),
            GradingError::Guard(GuardError::OwnableUnauthorized(teacher()))
        );
        let receipt = f.ledger.link_directories(&owner(), students, teachers).unwrap();
        assert_eq!(receipt.len(), 2);
    }
}
