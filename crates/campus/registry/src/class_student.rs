//! Class and student registry.
//!
//! Owns classes and their enrolled students. Deleting a class removes every
//! student enrolled in it. Teachers may move students between classes; the
//! teacher check goes through a late-bound [`TeacherDirectory`] handle.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use campus_guard::{AccessGuard, Guarded};
use campus_types::{
    AccountId, Class, ClassEvent, ClassId, GuardEvent, ModuleKind, Receipt, Student,
    StudentDirectory, StudentEvent, TeacherDirectory,
};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};

#[derive(Debug, Default)]
struct ClassStudentState {
    /// Registered classes in creation order
    classes: Vec<Class>,
    /// Enrolled class of every registered student
    students: HashMap<AccountId, ClassId>,
}

impl ClassStudentState {
    fn class(&self, id: ClassId) -> Option<&Class> {
        self.classes.iter().find(|c| c.id == id)
    }

    fn class_mut(&mut self, id: ClassId) -> Option<&mut Class> {
        self.classes.iter_mut().find(|c| c.id == id)
    }

    fn has_class(&self, id: ClassId) -> bool {
        self.class(id).is_some()
    }
}

pub struct ClassStudentRegistry {
    guard: AccessGuard,
    state: RwLock<ClassStudentState>,
    teachers: RwLock<Option<Weak<dyn TeacherDirectory>>>,
}

impl ClassStudentRegistry {
    pub fn new(owner: AccountId) -> Self {
        Self {
            guard: AccessGuard::new(ModuleKind::Students, owner),
            state: RwLock::new(ClassStudentState::default()),
            teachers: RwLock::new(None),
        }
    }

    fn teacher_directory(&self) -> Option<Arc<dyn TeacherDirectory>> {
        self.teachers.read().as_ref().and_then(Weak::upgrade)
    }

    /// Replace the back-reference to the teacher registry.
    pub fn link_teacher_directory(
        &self,
        caller: &AccountId,
        directory: Weak<dyn TeacherDirectory>,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        *self.teachers.write() = Some(directory);
        info!(caller = %caller, "Teacher directory linked");
        Ok(GuardEvent::DirectoryLinked {
            directory: ModuleKind::Teachers,
        }
        .into())
    }

    // ========================================================================
    // Classes
    // ========================================================================

    pub fn add_classes(&self, caller: &AccountId, ids: &[ClassId]) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        if ids.is_empty() {
            return Err(RegistryError::NoClassesProvided);
        }

        let mut state = self.state.write();
        let mut receipt = Receipt::new();
        for &id in ids {
            if state.has_class(id) {
                warn!(class = %id, "Class already exists");
                receipt.push(ClassEvent::AlreadyExists(id));
                continue;
            }
            state.classes.push(Class::new(id));
            info!(class = %id, "Class created");
            receipt.push(ClassEvent::Created(id));
        }
        Ok(receipt)
    }

    /// Deletes classes together with every student enrolled in them.
    pub fn delete_classes(&self, caller: &AccountId, ids: &[ClassId]) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        if ids.is_empty() {
            return Err(RegistryError::NoClassesProvided);
        }

        let mut state = self.state.write();
        if state.classes.is_empty() {
            return Err(RegistryError::NoClassesToDelete);
        }

        let mut receipt = Receipt::new();
        for &id in ids {
            let Some(pos) = state.classes.iter().position(|c| c.id == id) else {
                warn!(class = %id, "Class not found");
                receipt.push(ClassEvent::NotFound(id));
                continue;
            };

            let class = state.classes.remove(pos);
            if class.students.is_empty() {
                debug!(class = %id, "Class has no students to delete");
                receipt.push(StudentEvent::NoStudentsToDelete { class: id });
            }
            for student in &class.students {
                state.students.remove(student);
                info!(student = %student, class = %id, "Student deleted");
                receipt.push(StudentEvent::Deleted(*student));
            }

            info!(class = %id, "Class deleted");
            receipt.push(ClassEvent::Deleted(id));
        }
        Ok(receipt)
    }

    // ========================================================================
    // Students
    // ========================================================================

    pub fn register_students(
        &self,
        caller: &AccountId,
        ids: &[AccountId],
        class: ClassId,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        if ids.is_empty() {
            return Err(RegistryError::NoStudentsProvided);
        }

        let mut state = self.state.write();
        if !state.has_class(class) {
            return Err(RegistryError::ClassNotFound(class));
        }

        let mut receipt = Receipt::new();
        for id in ids {
            if id.is_zero() {
                warn!(class = %class, "Zero identity in student batch");
                receipt.push(StudentEvent::ZeroIdentity);
                continue;
            }
            if state.students.contains_key(id) {
                warn!(student = %id, "Student already exists");
                receipt.push(StudentEvent::AlreadyExists(*id));
                continue;
            }
            state.students.insert(*id, class);
            if let Some(roster) = state.class_mut(class) {
                roster.students.push(*id);
            }
            info!(student = %id, class = %class, "Student registered");
            receipt.push(StudentEvent::Registered(*id));
        }
        Ok(receipt)
    }

    pub fn delete_students(
        &self,
        caller: &AccountId,
        ids: &[AccountId],
        class: ClassId,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        if ids.is_empty() {
            return Err(RegistryError::NoStudentsProvided);
        }

        let mut state = self.state.write();
        match state.class(class) {
            None => return Err(RegistryError::ClassNotFound(class)),
            Some(c) if c.students.is_empty() => {
                return Err(RegistryError::NoStudentsToDelete(class))
            }
            Some(_) => {}
        }

        let mut receipt = Receipt::new();
        for id in ids {
            if id.is_zero() {
                warn!(class = %class, "Zero identity in student batch");
                receipt.push(StudentEvent::ZeroIdentity);
                continue;
            }
            match state.students.get(id).copied() {
                None => {
                    warn!(student = %id, "Student not found");
                    receipt.push(StudentEvent::NotFound(*id));
                }
                Some(enrolled) if enrolled != class => {
                    warn!(student = %id, class = %class, enrolled = %enrolled, "Student not enrolled in class");
                    receipt.push(StudentEvent::NotEnrolledInClass {
                        student: *id,
                        class,
                    });
                }
                Some(_) => {
                    state.students.remove(id);
                    if let Some(roster) = state.class_mut(class) {
                        roster.students.retain(|s| s != id);
                    }
                    info!(student = %id, class = %class, "Student deleted");
                    receipt.push(StudentEvent::Deleted(*id));
                }
            }
        }
        Ok(receipt)
    }

    /// Moves a student from `old_class` to `new_class`. Callable by the owner
    /// or any registered teacher. Every failure aborts the call.
    pub fn update_student(
        &self,
        caller: &AccountId,
        id: AccountId,
        old_class: ClassId,
        new_class: ClassId,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter(caller)?;
        if !self.guard.is_owner(caller) {
            let teachers = self
                .teacher_directory()
                .ok_or(RegistryError::TeacherDirectoryUnavailable)?;
            if !teachers.is_known_teacher(caller) {
                return Err(RegistryError::Unauthorized(*caller));
            }
        }
        if id.is_zero() {
            return Err(RegistryError::ZeroIdentity);
        }

        let mut state = self.state.write();
        let enrolled = *state
            .students
            .get(&id)
            .ok_or(RegistryError::StudentNotFound(id))?;
        if enrolled != old_class {
            return Err(RegistryError::NotEnrolledInClass {
                student: id,
                class: old_class,
            });
        }
        if !state.has_class(new_class) {
            return Err(RegistryError::ClassNotFound(new_class));
        }

        if old_class != new_class {
            if let Some(roster) = state.class_mut(old_class) {
                roster.students.retain(|s| *s != id);
            }
            if let Some(roster) = state.class_mut(new_class) {
                roster.students.push(id);
            }
            state.students.insert(id, new_class);
        }

        info!(student = %id, from = %old_class, to = %new_class, by = %caller, "Student updated");
        Ok(StudentEvent::Updated(id).into())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn all_classes(&self) -> Vec<ClassId> {
        self.state.read().classes.iter().map(|c| c.id).collect()
    }

    pub fn total_classes(&self) -> usize {
        self.state.read().classes.len()
    }

    pub fn class(&self, id: ClassId) -> Option<Class> {
        self.state.read().class(id).cloned()
    }

    /// Enrolled students in enrollment order; empty for an unknown class.
    pub fn all_students(&self, class: ClassId) -> Vec<AccountId> {
        self.state
            .read()
            .class(class)
            .map(|c| c.students.clone())
            .unwrap_or_default()
    }

    pub fn total_students(&self, class: ClassId) -> usize {
        self.state
            .read()
            .class(class)
            .map_or(0, |c| c.students.len())
    }

    pub fn student(&self, id: &AccountId) -> Option<Student> {
        self.state
            .read()
            .students
            .get(id)
            .map(|class| Student { id: *id, class: *class })
    }

    pub fn class_exists(&self, id: ClassId) -> bool {
        self.state.read().has_class(id)
    }

    pub fn student_exists(&self, id: &AccountId) -> bool {
        self.state.read().students.contains_key(id)
    }
}

impl Guarded for ClassStudentRegistry {
    fn guard(&self) -> &AccessGuard {
        &self.guard
    }
}

impl StudentDirectory for ClassStudentRegistry {
    fn is_known_student(&self, id: &AccountId) -> bool {
        self.student_exists(id)
    }

    fn is_known_class(&self, class: ClassId) -> bool {
        self.class_exists(class)
    }
}
