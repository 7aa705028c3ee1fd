//! Campus Runtime - a deployed, linked set of campus modules
//!
//! [`Campus::deploy`] creates the class/student registry, the teacher/course
//! registry, the grade ledger and the credential registry under one owner and
//! wires their directory links. [`Campus::execute`] routes a JSON-shaped
//! [`Request`] to a module entry point and appends committed events to the
//! [`Journal`].
#![deny(unsafe_code)]

pub mod campus;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod journal;

pub use campus::Campus;
pub use config::{CampusConfig, JournalConfig, LoggingConfig};
pub use dispatch::{Request, Response};
pub use error::{CampusError, Result};
pub use journal::{Journal, JournalEntry};
