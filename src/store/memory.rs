use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::app::{Result, StoryError};
use crate::domain::InteractionState;
use crate::store::Store;

/// Process-local store used for previews and tests.
///
/// Counts writes so callers can check that no redundant persistence happens.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<InteractionState>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: InteractionState) -> Self {
        Self {
            state: Mutex::new(state),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of successful save calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn with_lock<T>(&self, f: impl FnOnce(&mut InteractionState) -> T) -> Result<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| StoryError::Other(format!("memory store poisoned: {}", e)))?;
        Ok(f(&mut state))
    }
}

impl Store for MemoryStore {
    fn load_seen_user_ids(&self) -> Result<HashSet<i64>> {
        self.with_lock(|state| state.seen_user_ids.clone())
    }

    fn save_seen_user_ids(&self, ids: &HashSet<i64>) -> Result<()> {
        self.with_lock(|state| state.seen_user_ids = ids.clone())?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_liked_item_ids(&self) -> Result<HashSet<String>> {
        self.with_lock(|state| state.liked_item_ids.clone())
    }

    fn save_liked_item_ids(&self, ids: &HashSet<String>) -> Result<()> {
        self.with_lock(|state| state.liked_item_ids = ids.clone())?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
