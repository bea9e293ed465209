use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-card critical sections.
///
/// Reviews of the same card run one at a time; different cards never
/// contend beyond the short map lookup. Entries are dropped once no caller
/// holds or waits on them.
#[derive(Debug, Default)]
pub struct CardLocks {
    entries: Mutex<HashMap<i32, Arc<Mutex<()>>>>,
}

impl CardLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `card_id`
    pub fn with_card<T>(&self, card_id: i32, f: impl FnOnce() -> T) -> T {
        let entry = CardEntry {
            locks: self,
            card_id,
            lock: self.entry(card_id),
        };
        let _guard = entry.lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of cards with a pending or running review
    #[cfg(test)]
    fn active(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn entry(&self, card_id: i32) -> Arc<Mutex<()>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.entry(card_id).or_default().clone()
    }

    /// Drop the entry when only the map and the releasing caller still hold it
    fn release(&self, card_id: i32) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.get(&card_id).is_some_and(|lock| Arc::strong_count(lock) <= 2) {
            entries.remove(&card_id);
        }
    }
}

/// A caller's claim on a map entry. Dropping it releases the entry, also
/// when the closure panics.
struct CardEntry<'a> {
    locks: &'a CardLocks,
    card_id: i32,
    lock: Arc<Mutex<()>>,
}

impl Drop for CardEntry<'_> {
    fn drop(&mut self) {
        self.locks.release(self.card_id);
    }
}
