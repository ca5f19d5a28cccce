//! Per-key mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// A table of locks indexed by cache key.
///
/// [`with_lock`](Self::with_lock) runs a closure while holding the lock for
/// one key, so a staleness check, the compute it triggers and the record
/// write form one critical section. Different keys never block each other.
/// Entries are dropped once no caller holds or waits on them.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    table: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `key`.
    pub fn with_lock<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        let entry = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            table.entry(key.to_string()).or_default().clone()
        };

        let result = {
            let _guard = entry.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // The table holds one reference and `entry` the other.
        if Arc::strong_count(&entry) == 2 {
            table.remove(key);
        }
        result
    }

    /// Number of keys currently locked or waited on.
    pub fn active(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
