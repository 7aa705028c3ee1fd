//! Caller roles as resolved from a bare identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an identity. The numeric encoding is stable and exposed to
/// consumers (`Unauthorized = 0` through `Admin = 3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Role {
    Unauthorized = 0,
    Student = 1,
    Teacher = 2,
    Admin = 3,
}

impl Role {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Admin and Teacher may write grades and mint certificates.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Teacher)
    }
}

impl TryFrom<u8> for Role {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Role::Unauthorized),
            1 => Ok(Role::Student),
            2 => Ok(Role::Teacher),
            3 => Ok(Role::Admin),
            other => Err(other),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Unauthorized => "unauthorized",
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}
