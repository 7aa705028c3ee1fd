//! Campus Grading - grade ledger and role resolution
//!
//! The [`GradeLedger`] owns grades and is the place where a bare caller
//! identity is resolved to a [`Role`](campus_types::Role).
#![deny(unsafe_code)]

pub mod error;
pub mod ledger;
pub mod role;

pub use error::{GradingError, Result};
pub use ledger::GradeLedger;
pub use role::resolve_role;
