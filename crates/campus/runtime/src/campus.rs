//! Deployment and linking of the campus modules.

use std::sync::Arc;

use campus_credential::CredentialRegistry;
use campus_grading::GradeLedger;
use campus_guard::Guarded;
use campus_registry::{ClassStudentRegistry, TeacherCourseRegistry};
use campus_types::{
    AccountId, GradeDirectory, ModuleKind, Receipt, Role, StudentDirectory, TeacherDirectory,
};
use tracing::info;

use crate::config::CampusConfig;
use crate::error::{CampusError, Result};
use crate::journal::Journal;

/// A deployed campus: the four addressable modules, linked, plus the
/// journal of everything they committed.
pub struct Campus {
    config: CampusConfig,
    students: Arc<ClassStudentRegistry>,
    teachers: Arc<TeacherCourseRegistry>,
    grades: Arc<GradeLedger>,
    credentials: Arc<CredentialRegistry>,
    journal: Journal,
}

impl Campus {
    /// Create every module owned by the configured owner and link them.
    ///
    /// The two registries point at each other through weak handles; the
    /// ledger and the credential registry hold strong handles to what they
    /// consult.
    pub fn deploy(config: CampusConfig) -> Result<Self> {
        let owner = config.owner.ok_or(CampusError::MissingOwner)?;
        if owner.is_zero() {
            return Err(CampusError::InvalidOwner(owner));
        }

        let students = Arc::new(ClassStudentRegistry::new(owner));
        let teachers = Arc::new(TeacherCourseRegistry::new(owner));
        let grades = Arc::new(GradeLedger::new(owner, students.clone(), teachers.clone()));
        let credentials = Arc::new(CredentialRegistry::new(
            owner,
            grades.clone(),
            teachers.clone(),
        ));

        let campus = Self {
            journal: Journal::new(config.journal.enabled),
            config,
            students,
            teachers,
            grades,
            credentials,
        };
        let receipt = campus.link_teacher_directory(&owner)?;
        campus.journal.record(ModuleKind::Students, owner, &receipt);
        let receipt = campus.link_student_directory(&owner)?;
        campus.journal.record(ModuleKind::Teachers, owner, &receipt);

        info!(owner = %owner, "Campus deployed");
        Ok(campus)
    }

    pub(crate) fn link_teacher_directory(&self, caller: &AccountId) -> Result<Receipt> {
        let directory: Arc<dyn TeacherDirectory> = self.teachers.clone();
        Ok(self
            .students
            .link_teacher_directory(caller, Arc::downgrade(&directory))?)
    }

    pub(crate) fn link_student_directory(&self, caller: &AccountId) -> Result<Receipt> {
        let directory: Arc<dyn StudentDirectory> = self.students.clone();
        Ok(self
            .teachers
            .link_student_directory(caller, Arc::downgrade(&directory))?)
    }

    pub(crate) fn link_grade_directories(&self, caller: &AccountId) -> Result<Receipt> {
        Ok(self
            .grades
            .link_directories(caller, self.students.clone(), self.teachers.clone())?)
    }

    pub(crate) fn link_credential_directories(&self, caller: &AccountId) -> Result<Receipt> {
        let grades: Arc<dyn GradeDirectory> = self.grades.clone();
        Ok(self
            .credentials
            .link_directories(caller, grades, self.teachers.clone())?)
    }

    pub fn config(&self) -> &CampusConfig {
        &self.config
    }

    pub fn students(&self) -> &ClassStudentRegistry {
        &self.students
    }

    pub fn teachers(&self) -> &TeacherCourseRegistry {
        &self.teachers
    }

    pub fn grades(&self) -> &GradeLedger {
        &self.grades
    }

    pub fn credentials(&self) -> &CredentialRegistry {
        &self.credentials
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Ownership and pause state of one module.
    pub fn module(&self, module: ModuleKind) -> &dyn Guarded {
        match module {
            ModuleKind::Students => self.students.as_ref(),
            ModuleKind::Teachers => self.teachers.as_ref(),
            ModuleKind::Grades => self.grades.as_ref(),
            ModuleKind::Credentials => self.credentials.as_ref(),
        }
    }

    pub fn role_of(&self, id: &AccountId) -> Role {
        self.grades.role_of(id)
    }
}
