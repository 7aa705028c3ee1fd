//! Campus Credential - certificates backed by recorded grades
//!
//! A certificate is minted by staff for a grade that exists at mint time and
//! belongs to the named course. Later grade or course deletion does not
//! touch issued certificates.
#![deny(unsafe_code)]

mod error;

pub use error::{CredentialError, Result};

use std::collections::BTreeMap;
use std::sync::Arc;

use campus_guard::{AccessGuard, Guarded};
use campus_types::{
    AccountId, Certificate, CertificateEvent, CertificateId, CourseId, GradeDirectory, GradeId,
    GuardEvent, ModuleKind, Receipt, TeacherDirectory,
};
use parking_lot::RwLock;
use tracing::info;

#[derive(Debug, Default)]
struct CertificateState {
    certificates: BTreeMap<CertificateId, Certificate>,
    next_id: u64,
}

struct Directories {
    grades: Arc<dyn GradeDirectory>,
    teachers: Arc<dyn TeacherDirectory>,
}

/// Registry of minted certificates
pub struct CredentialRegistry {
    guard: AccessGuard,
    state: RwLock<CertificateState>,
    directories: RwLock<Directories>,
}

impl CredentialRegistry {
    pub fn new(
        owner: AccountId,
        grades: Arc<dyn GradeDirectory>,
        teachers: Arc<dyn TeacherDirectory>,
    ) -> Self {
        Self {
            guard: AccessGuard::new(ModuleKind::Credentials, owner),
            state: RwLock::new(CertificateState::default()),
            directories: RwLock::new(Directories { grades, teachers }),
        }
    }

    fn grades(&self) -> Arc<dyn GradeDirectory> {
        self.directories.read().grades.clone()
    }

    fn teachers(&self) -> Arc<dyn TeacherDirectory> {
        self.directories.read().teachers.clone()
    }

    pub fn link_directories(
        &self,
        caller: &AccountId,
        grades: Arc<dyn GradeDirectory>,
        teachers: Arc<dyn TeacherDirectory>,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        *self.directories.write() = Directories { grades, teachers };
        info!(caller = %caller, "Credential directories linked");

        let mut receipt = Receipt::new();
        receipt.push(GuardEvent::DirectoryLinked {
            directory: ModuleKind::Grades,
        });
        receipt.push(GuardEvent::DirectoryLinked {
            directory: ModuleKind::Teachers,
        });
        Ok(receipt)
    }

    /// Mint a certificate for `owner` backed by `grade` in `course`.
    pub fn mint(
        &self,
        caller: &AccountId,
        owner: AccountId,
        grade: GradeId,
        course: CourseId,
        image: impl Into<String>,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter(caller)?;
        let grades = self.grades();
        if !grades.role_of(caller).is_staff() {
            return Err(CredentialError::Unauthorized(*caller));
        }
        if owner.is_zero() {
            return Err(CredentialError::ZeroIdentity);
        }
        if !self.teachers().is_known_course(course) {
            return Err(CredentialError::CourseNotFound(course));
        }
        match grades.grade_course(grade) {
            None => return Err(CredentialError::GradeNotFound(grade)),
            Some(recorded) if recorded != course => {
                return Err(CredentialError::GradeCourseMismatch { grade, course })
            }
            Some(_) => {}
        }

        let mut state = self.state.write();
        let id = CertificateId(state.next_id);
        state.next_id += 1;
        state.certificates.insert(
            id,
            Certificate {
                id,
                owner,
                grade,
                course,
                image: image.into(),
            },
        );

        info!(certificate = %id, owner = %owner, grade = %grade, course = %course, "Certificate minted");
        Ok(CertificateEvent::Created(id).into())
    }

    /// Reassign a certificate. Registry owner only.
    pub fn update(
        &self,
        caller: &AccountId,
        id: CertificateId,
        new_owner: AccountId,
        new_image: impl Into<String>,
    ) -> Result<Receipt> {
        let _lock = self.guard.enter_as_owner(caller)?;
        if new_owner.is_zero() {
            return Err(CredentialError::ZeroIdentity);
        }

        let mut state = self.state.write();
        let certificate = state
            .certificates
            .get_mut(&id)
            .ok_or(CredentialError::CertificateNotFound(id))?;
        certificate.owner = new_owner;
        certificate.image = new_image.into();

        info!(certificate = %id, owner = %new_owner, "Certificate updated");
        Ok(CertificateEvent::Updated(id).into())
    }

    pub fn certificate(&self, id: CertificateId) -> Result<Certificate> {
        self.state
            .read()
            .certificates
            .get(&id)
            .cloned()
            .ok_or(CredentialError::CertificateNotFound(id))
    }

    pub fn total_certificates(&self) -> usize {
        self.state.read().certificates.len()
    }

    pub fn certificates_of(&self, owner: &AccountId) -> Vec<CertificateId> {
        self.state
            .read()
            .certificates
            .values()
            .filter(|c| c.owner == *owner)
            .map(|c| c.id)
            .collect()
    }
}

impl Guarded for CredentialRegistry {
    fn guard(&self) -> &AccessGuard {
        &self.guard
    }
}
