//! Teacher and course registry.
//!
//! Owns teachers and the courses they teach. A course always belongs to
//! exactly one registered teacher; deleting the teacher deletes the course.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use campus_guard::{AccessGuard, Guarded};
use campus_types::{
    AccountId, ClassId, Course, CourseEvent, CourseId, GuardEvent, ModuleKind, Receipt,
    StudentDirectory, Teacher, TeacherDirectory, TeacherEvent,
};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};

#[derive(Debug, Default)]
struct TeacherCourseState {
    /// Registration order
    order: Vec<AccountId>,
    teachers: HashMap<AccountId, Teacher>,
    courses: HashMap<CourseId, Course>,
}

impl TeacherCourseState {
    fn remove_course(&mut self, id: CourseId) -> Option<Course> {
        let course = self.courses.remove(&id)?;
        if let Some(teacher) = self.teachers.get_mut(&course.teacher) {
            teacher.courses.retain(|c| *c != id);
        }
        Some(course)
    }
}

pub struct TeacherCourseRegistry {
    guard: AccessGuard,
    state: RwLock<TeacherCourseState>,
    students: RwLock<Option<Weak<dyn StudentDirectory>>>,
}

impl TeacherCourseRegistry {
    pub fn new(owner: AccountId) -> Self {
        Self {
            guard: AccessGuard::new(ModuleKind::Teachers, owner),
            state: RwLock::new(TeacherCourseState::default()),
            students: RwLock::new(None),
        }
    }

    fn student_directory(&self) -> Option<Arc<dyn StudentDirectory>> {
        self.students.read().as_ref().and_then(Weak::upgrade)
    }

    pub fn link_student_directory(
        &self,
        caller: &AccountId,
        directory: Weak<dyn StudentDirectory>,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        *self.students.write() = Some(directory);
        info!(caller = %caller, "Student directory linked");
        Ok(GuardEvent::DirectoryLinked {
            directory: ModuleKind::Students,
        }
        .into())
    }

    /// Owner or the named teacher.
    fn ensure_owner_or_teacher(&self, caller: &AccountId, teacher: &AccountId) -> Result<()> {
        if self.guard.is_owner(caller) || caller == teacher {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized(*caller))
        }
    }

    // ========================================================================
    // Teachers
    // ========================================================================

    pub fn register_teachers(
        &self,
        caller: &AccountId,
        ids: &[AccountId],
        classes: &[ClassId],
    ) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        if ids.is_empty() {
            return Err(RegistryError::NoTeachersProvided);
        }
        if classes.is_empty() {
            return Err(RegistryError::NoClassesProvided);
        }
        if ids.len() != classes.len() {
            return Err(RegistryError::TeachersClassesLengthMismatch {
                teachers: ids.len(),
                classes: classes.len(),
            });
        }

        let mut state = self.state.write();
        let mut receipt = Receipt::new();
        for (id, class) in ids.iter().zip(classes) {
            if id.is_zero() {
                warn!("Zero identity in teacher batch");
                receipt.push(TeacherEvent::ZeroIdentity);
                continue;
            }
            if state.teachers.contains_key(id) {
                warn!(teacher = %id, "Teacher already exists");
                receipt.push(TeacherEvent::AlreadyExists(*id));
                continue;
            }
            state.teachers.insert(
                *id,
                Teacher {
                    id: *id,
                    class: *class,
                    courses: Vec::new(),
                },
            );
            state.order.push(*id);
            info!(teacher = %id, class = %class, "Teacher registered");
            receipt.push(TeacherEvent::Registered(*id));
        }
        Ok(receipt)
    }

    /// Deletes teachers together with every course they own.
    pub fn delete_teachers(&self, caller: &AccountId, ids: &[AccountId]) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        if ids.is_empty() {
            return Err(RegistryError::NoTeachersProvided);
        }

        let mut state = self.state.write();
        if state.teachers.is_empty() {
            return Err(RegistryError::NoTeachersToDelete);
        }

        let mut receipt = Receipt::new();
        for id in ids {
            if id.is_zero() {
                warn!("Zero identity in teacher batch");
                receipt.push(TeacherEvent::ZeroIdentity);
                continue;
            }
            let Some(teacher) = state.teachers.remove(id) else {
                warn!(teacher = %id, "Teacher not found");
                receipt.push(TeacherEvent::NotFound(*id));
                continue;
            };
            state.order.retain(|t| t != id);

            if teacher.courses.is_empty() {
                debug!(teacher = %id, "Teacher has no courses to delete");
                receipt.push(CourseEvent::NoCoursesToDelete { teacher: *id });
            }
            for course in &teacher.courses {
                state.courses.remove(course);
                info!(course = %course, teacher = %id, "Course deleted");
                receipt.push(CourseEvent::Deleted(*course));
            }

            info!(teacher = %id, "Teacher deleted");
            receipt.push(TeacherEvent::Deleted(*id));
        }
        Ok(receipt)
    }

    /// Moves a teacher to another home class. The class must be known to the
    /// linked student directory.
    pub fn update_teacher(
        &self,
        caller: &AccountId,
        id: AccountId,
        new_class: ClassId,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        if id.is_zero() {
            return Err(RegistryError::ZeroIdentity);
        }
        if !self.teacher_exists(&id) {
            return Err(RegistryError::TeacherNotFound(id));
        }
        let students = self
            .student_directory()
            .ok_or(RegistryError::StudentDirectoryUnavailable)?;
        if !students.is_known_class(new_class) {
            return Err(RegistryError::ClassNotFound(new_class));
        }

        let mut state = self.state.write();
        let teacher = state
            .teachers
            .get_mut(&id)
            .ok_or(RegistryError::TeacherNotFound(id))?;
        teacher.class = new_class;
        info!(teacher = %id, class = %new_class, "Teacher updated");
        Ok(TeacherEvent::Updated(id).into())
    }

    // ========================================================================
    // Courses
    // ========================================================================

    pub fn register_course(
        &self,
        caller: &AccountId,
        teacher: AccountId,
        courses: &[CourseId],
        classes: &[ClassId],
        modules: &[u8],
    ) -> Result<Receipt> {
        let _lock = self.guard.enter(caller)?;
        self.ensure_owner_or_teacher(caller, &teacher)?;
        if courses.is_empty() {
            return Err(RegistryError::NoCoursesProvided);
        }
        if classes.is_empty() {
            return Err(RegistryError::NoClassesProvided);
        }
        if modules.is_empty() {
            return Err(RegistryError::NoModulesProvided);
        }
        if courses.len() != classes.len() || courses.len() != modules.len() {
            return Err(RegistryError::CoursesClassesModulesLengthMismatch {
                courses: courses.len(),
                classes: classes.len(),
                modules: modules.len(),
            });
        }
        if teacher.is_zero() {
            return Err(RegistryError::ZeroIdentity);
        }

        let mut state = self.state.write();
        if !state.teachers.contains_key(&teacher) {
            return Err(RegistryError::TeacherNotFound(teacher));
        }
        if let Some(pos) = modules.iter().position(|m| *m == 0) {
            return Err(RegistryError::InvalidModuleCount {
                course: courses[pos],
            });
        }

        let mut receipt = Receipt::new();
        for ((id, class), count) in courses.iter().zip(classes).zip(modules) {
            if state.courses.contains_key(id) {
                warn!(course = %id, "Course already exists");
                receipt.push(CourseEvent::AlreadyExists(*id));
                continue;
            }
            state.courses.insert(
                *id,
                Course {
                    id: *id,
                    teacher,
                    class: *class,
                    modules: *count,
                },
            );
            if let Some(owner) = state.teachers.get_mut(&teacher) {
                owner.courses.push(*id);
            }
            info!(course = %id, teacher = %teacher, class = %class, modules = count, "Course registered");
            receipt.push(CourseEvent::Registered(*id));
        }
        Ok(receipt)
    }

    pub fn delete_courses(
        &self,
        caller: &AccountId,
        courses: &[CourseId],
        teacher: AccountId,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter(caller)?;
        self.ensure_owner_or_teacher(caller, &teacher)?;
        if courses.is_empty() {
            return Err(RegistryError::NoCoursesProvided);
        }
        if teacher.is_zero() {
            return Err(RegistryError::ZeroIdentity);
        }

        let mut state = self.state.write();
        if !state.teachers.contains_key(&teacher) {
            return Err(RegistryError::TeacherNotFound(teacher));
        }

        let mut receipt = Receipt::new();
        for id in courses {
            match state.courses.get(id).map(|c| c.teacher) {
                None => {
                    warn!(course = %id, "Course not found");
                    receipt.push(CourseEvent::NotFound(*id));
                }
                Some(owner) if owner != teacher => {
                    warn!(course = %id, teacher = %teacher, owner = %owner, "Course not owned by teacher");
                    receipt.push(CourseEvent::NotOwned(*id));
                }
                Some(_) => {
                    state.remove_course(*id);
                    info!(course = %id, teacher = %teacher, "Course deleted");
                    receipt.push(CourseEvent::Deleted(*id));
                }
            }
        }
        Ok(receipt)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn all_teachers(&self) -> Vec<AccountId> {
        self.state.read().order.clone()
    }

    pub fn total_teachers(&self) -> usize {
        self.state.read().order.len()
    }

    pub fn teacher(&self, id: &AccountId) -> Option<Teacher> {
        self.state.read().teachers.get(id).cloned()
    }

    pub fn courses_by_teacher(&self, id: &AccountId) -> Vec<CourseId> {
        self.state
            .read()
            .teachers
            .get(id)
            .map(|t| t.courses.clone())
            .unwrap_or_default()
    }

    pub fn total_courses_by_teacher(&self, id: &AccountId) -> usize {
        self.state
            .read()
            .teachers
            .get(id)
            .map_or(0, |t| t.courses.len())
    }

    pub fn course(&self, id: CourseId) -> Option<Course> {
        self.state.read().courses.get(&id).copied()
    }

    pub fn course_teacher(&self, id: CourseId) -> Option<AccountId> {
        self.state.read().courses.get(&id).map(|c| c.teacher)
    }

    pub fn teacher_exists(&self, id: &AccountId) -> bool {
        self.state.read().teachers.contains_key(id)
    }

    pub fn course_exists(&self, id: CourseId) -> bool {
        self.state.read().courses.contains_key(&id)
    }
}

impl Guarded for TeacherCourseRegistry {
    fn guard(&self) -> &AccessGuard {
        &self.guard
    }
}

impl TeacherDirectory for TeacherCourseRegistry {
    fn is_known_teacher(&self, id: &AccountId) -> bool {
        self.teacher_exists(id)
    }

    fn is_known_course(&self, course: CourseId) -> bool {
        self.course_exists(course)
    }

    fn course(&self, course: CourseId) -> Option<Course> {
        TeacherCourseRegistry::course(self, course)
    }
}
