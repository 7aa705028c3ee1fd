//! Append-only record of committed events.

use campus_types::{AccountId, Event, ModuleKind, Receipt};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    pub module: ModuleKind,
    pub caller: AccountId,
    pub event: Event,
}

#[derive(Debug)]
pub struct Journal {
    enabled: bool,
    entries: RwLock<Vec<JournalEntry>>,
}

impl Journal {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append every event of a committed receipt. Returns the number of
    /// entries written.
    pub fn record(&self, module: ModuleKind, caller: AccountId, receipt: &Receipt) -> usize {
        if !self.enabled {
            return 0;
        }
        let mut entries = self.entries.write();
        for event in receipt.events() {
            let seq = entries.len() as u64;
            entries.push(JournalEntry {
                seq,
                module,
                caller,
                event: *event,
            });
        }
        receipt.len()
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.read().clone()
    }

    /// Entries with `seq >= from`
    pub fn since(&self, from: u64) -> Vec<JournalEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.seq >= from)
            .cloned()
            .collect()
    }

    pub fn for_module(&self, module: ModuleKind) -> Vec<JournalEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.module == module)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
