//! Registry records. Each record is owned by exactly one registry; other
//! registries only ever see snapshots of it.

use crate::ids::{AccountId, CertificateId, ClassId, CourseId, GradeId};
use crate::score::Score;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    /// Enrolled students in enrollment order
    pub students: Vec<AccountId>,
}

impl Class {
    pub fn new(id: ClassId) -> Self {
        Self {
            id,
            students: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: AccountId,
    pub class: ClassId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: AccountId,
    /// Home class
    pub class: ClassId,
    /// Owned courses in registration order
    pub courses: Vec<CourseId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub teacher: AccountId,
    pub class: ClassId,
    /// Number of modules, always at least 1
    pub modules: u8,
}

impl Course {
    pub fn has_module(&self, module: u8) -> bool {
        (1..=self.modules).contains(&module)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub student: AccountId,
    pub teacher: AccountId,
    pub course: CourseId,
    pub module: u8,
    pub score: Score,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    pub owner: AccountId,
    pub grade: GradeId,
    pub course: CourseId,
    /// Reference to the credential image (URI or content hash)
    pub image: String,
}
