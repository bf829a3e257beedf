//! In-process row locks for at-most-once tile resolution.
//!
//! Sled has no row-level locking, so the store keeps its own registry of
//! held `(family, id)` keys. `acquire` blocks until the key is free and
//! hands back a RAII guard; dropping the guard releases the key and wakes
//! waiters. With every resolution path doing its read-check-mutate-write
//! under a guard, two concurrent actions on the same tile serialize and
//! the loser sees `action_taken` already set.
//!
//! Lock ordering is fixed: paths that need both rows take the tile guard
//! first, then the player guard. Nothing acquires in the other order, so
//! the two families cannot deadlock.

use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex};

/// Identifies one lockable row: a family name plus the record id.
pub type LockKey = (&'static str, u64);

/// Lock family for tile rows.
pub const FAMILY_TILES: &str = "tiles";
/// Lock family for player rows.
pub const FAMILY_PLAYERS: &str = "players";

#[derive(Debug, Default)]
struct LockTableInner {
    held: Mutex<HashSet<LockKey>>,
    released: Condvar,
}

/// Registry of currently held row locks, shared by all store handles.
#[derive(Debug, Clone, Default)]
pub struct LockTable {
    inner: Arc<LockTableInner>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `(family, id)` is free, then hold it. The returned
    /// guard releases the key on drop.
    pub fn acquire(&self, family: &'static str, id: u64) -> RowGuard {
        let key = (family, id);
        let mut held = self.inner.held.lock().unwrap();
        while held.contains(&key) {
            held = self.inner.released.wait(held).unwrap();
        }
        held.insert(key);
        RowGuard {
            inner: Arc::clone(&self.inner),
            key,
        }
    }

    /// Non-blocking variant; `None` if the key is currently held.
    pub fn try_acquire(&self, family: &'static str, id: u64) -> Option<RowGuard> {
        let key = (family, id);
        let mut held = self.inner.held.lock().unwrap();
        if held.contains(&key) {
            return None;
        }
        held.insert(key);
        Some(RowGuard {
            inner: Arc::clone(&self.inner),
            key,
        })
    }

    /// True while some guard holds `(family, id)`.
    pub fn is_held(&self, family: &'static str, id: u64) -> bool {
        self.inner.held.lock().unwrap().contains(&(family, id))
    }
}

/// RAII handle for one held row lock.
#[derive(Debug)]
pub struct RowGuard {
    inner: Arc<LockTableInner>,
    key: LockKey,
}

impl Drop for RowGuard {
    fn drop(&mut self) {
        let mut held = self.inner.held.lock().unwrap();
        held.remove(&self.key);
        self.inner.released.notify_all();
    }
}
