//! Campus Guard - owner identity, pause flag and reentrancy lock
//!
//! Every campus module embeds one [`AccessGuard`]. A mutating entry point
//! passes, in order, the pause check, the reentrancy check and then its own
//! role check. The reentrancy lock is an RAII [`EntryLock`] so it is released
//! on every exit path.
#![deny(unsafe_code)]

mod error;

pub use error::GuardError;

use std::collections::HashSet;

use campus_types::{AccountId, GuardEvent, ModuleKind, Receipt};
use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

pub type Result<T> = std::result::Result<T, GuardError>;

#[derive(Debug)]
struct GuardState {
    owner: AccountId,
    paused: bool,
}

/// Ownership, pause and reentrancy state of one module.
#[derive(Debug)]
pub struct AccessGuard {
    module: ModuleKind,
    state: RwLock<GuardState>,
    /// Callers currently executing inside the module
    active: Mutex<HashSet<AccountId>>,
}

/// Held for the duration of a guarded entry point.
#[must_use = "the caller is unlocked as soon as the lock is dropped"]
#[derive(Debug)]
pub struct EntryLock<'a> {
    guard: &'a AccessGuard,
    caller: AccountId,
}

impl EntryLock<'_> {
    pub fn caller(&self) -> AccountId {
        self.caller
    }
}

impl Drop for EntryLock<'_> {
    fn drop(&mut self) {
        self.guard.active.lock().remove(&self.caller);
    }
}

impl AccessGuard {
    pub fn new(module: ModuleKind, owner: AccountId) -> Self {
        Self {
            module,
            state: RwLock::new(GuardState {
                owner,
                paused: false,
            }),
            active: Mutex::new(HashSet::new()),
        }
    }

    pub fn module(&self) -> ModuleKind {
        self.module
    }

    pub fn owner(&self) -> AccountId {
        self.state.read().owner
    }

    pub fn is_paused(&self) -> bool {
        self.state.read().paused
    }

    /// A renounced module has no owner; the zero identity never matches.
    pub fn is_owner(&self, caller: &AccountId) -> bool {
        let owner = self.owner();
        !owner.is_zero() && owner == *caller
    }

    pub fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(GuardError::OwnableUnauthorized(*caller))
        }
    }

    /// Whether `caller` is currently executing inside the module.
    pub fn is_entered(&self, caller: &AccountId) -> bool {
        self.active.lock().contains(caller)
    }

    /// Pause check followed by reentrancy check.
    pub fn enter(&self, caller: &AccountId) -> Result<EntryLock<'_>> {
        if self.is_paused() {
            return Err(GuardError::Paused);
        }
        self.lock_caller(caller)
    }

    /// [`enter`](Self::enter) followed by the owner check.
    pub fn enter_as_owner(&self, caller: &AccountId) -> Result<EntryLock<'_>> {
        let lock = self.enter(caller)?;
        self.ensure_owner(caller)?;
        Ok(lock)
    }

    fn lock_caller(&self, caller: &AccountId) -> Result<EntryLock<'_>> {
        if !self.active.lock().insert(*caller) {
            warn!(module = %self.module, caller = %caller, "Reentrant call rejected");
            return Err(GuardError::AccountLocked(*caller));
        }
        Ok(EntryLock {
            guard: self,
            caller: *caller,
        })
    }

    /// Enters the module and immediately tries to enter it again as the same
    /// caller. Always fails: with `AccountLocked(caller)` when the lock works.
    pub fn reentry_check(&self, caller: &AccountId) -> Result<()> {
        let _outer = self.enter(caller)?;
        let _inner = self.enter(caller)?;
        Ok(())
    }

    // ========================================================================
    // Owner operations
    // ========================================================================

    pub fn pause(&self, caller: &AccountId) -> Result<Receipt> {
        let _lock = self.enter_as_owner(caller)?;
        self.state.write().paused = true;
        info!(module = %self.module, by = %caller, "Module paused");
        Ok(GuardEvent::Paused { by: *caller }.into())
    }

    pub fn unpause(&self, caller: &AccountId) -> Result<Receipt> {
        if !self.is_paused() {
            return Err(GuardError::NotPaused);
        }
        let _lock = self.lock_caller(caller)?;
        self.ensure_owner(caller)?;
        self.state.write().paused = false;
        info!(module = %self.module, by = %caller, "Module unpaused");
        Ok(GuardEvent::Unpaused { by: *caller }.into())
    }

    /// Ownership changes remain available while paused.
    pub fn transfer_ownership(&self, caller: &AccountId, new_owner: AccountId) -> Result<Receipt> {
        let _lock = self.lock_caller(caller)?;
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(GuardError::InvalidOwner(new_owner));
        }
        Ok(self.set_owner(new_owner).into())
    }

    pub fn renounce_ownership(&self, caller: &AccountId) -> Result<Receipt> {
        let _lock = self.lock_caller(caller)?;
        self.ensure_owner(caller)?;
        Ok(self.set_owner(AccountId::ZERO).into())
    }

    fn set_owner(&self, new_owner: AccountId) -> GuardEvent {
        let previous = std::mem::replace(&mut self.state.write().owner, new_owner);
        info!(
            module = %self.module,
            previous = %previous,
            new = %new_owner,
            "Ownership transferred"
        );
        GuardEvent::OwnershipTransferred {
            previous,
            new: new_owner,
        }
    }
}

/// Implemented by every module that embeds an [`AccessGuard`].
pub trait Guarded {
    fn guard(&self) -> &AccessGuard;

    fn owner(&self) -> AccountId {
        self.guard().owner()
    }

    fn is_paused(&self) -> bool {
        self.guard().is_paused()
    }

    fn pause(&self, caller: &AccountId) -> Result<Receipt> {
        self.guard().pause(caller)
    }

    fn unpause(&self, caller: &AccountId) -> Result<Receipt> {
        self.guard().unpause(caller)
    }

    fn transfer_ownership(&self, caller: &AccountId, new_owner: AccountId) -> Result<Receipt> {
        self.guard().transfer_ownership(caller, new_owner)
    }

    fn renounce_ownership(&self, caller: &AccountId) -> Result<Receipt> {
        self.guard().renounce_ownership(caller)
    }

    fn reentry_check(&self, caller: &AccountId) -> Result<()> {
        self.guard().reentry_check(caller)
    }
}

impl Guarded for AccessGuard {
    fn guard(&self) -> &AccessGuard {
        self
    }
}
