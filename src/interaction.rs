//! Persisted seen/liked sets with replay-latest change streams.
//!
//! Every mutation that changes a set is written through to the [`Store`]
//! before the new set is published. Subscribers get a
//! [`watch::Receiver`] that already holds the current set.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::app::{Result, StoryError};
use crate::domain::InteractionState;
use crate::store::Store;

pub struct InteractionStore {
    store: Arc<dyn Store>,
    seen: watch::Sender<HashSet<i64>>,
    liked: watch::Sender<HashSet<String>>,
    // Serializes read-modify-write cycles against the backing store.
    write_lock: Mutex<()>,
}

impl InteractionStore {
    /// Load both sets from `store`. An unreadable entry starts empty.
    pub fn new(store: Arc<dyn Store>) -> Self {
        let seen = store.load_seen_user_ids().unwrap_or_else(|e| {
            warn!("Discarding unreadable seen-story state: {}", e);
            HashSet::new()
        });
        let liked = store.load_liked_item_ids().unwrap_or_else(|e| {
            warn!("Discarding unreadable liked-item state: {}", e);
            HashSet::new()
        });

        debug!(
            seen = seen.len(),
            liked = liked.len(),
            "Loaded interaction state"
        );

        let (seen, _) = watch::channel(seen);
        let (liked, _) = watch::channel(liked);

        Self {
            store,
            seen,
            liked,
            write_lock: Mutex::new(()),
        }
    }

    pub fn is_seen(&self, user_id: i64) -> bool {
        self.seen.borrow().contains(&user_id)
    }

    /// Mark `user_id`'s story as seen.
    ///
    /// Returns `true` if the set changed. Re-marking writes nothing and
    /// publishes nothing.
    pub fn mark_seen(&self, user_id: i64) -> Result<bool> {
        let _guard = self.write_guard()?;

        if self.seen.borrow().contains(&user_id) {
            return Ok(false);
        }

        let mut updated = self.seen.borrow().clone();
        updated.insert(user_id);
        self.store.save_seen_user_ids(&updated)?;
        self.seen.send_replace(updated);

        debug!(user_id, "Marked story seen");
        Ok(true)
    }

    pub fn is_liked(&self, item_id: &str) -> bool {
        self.liked.borrow().contains(item_id)
    }

    /// Flip the like on `item_id`. Returns the new membership.
    pub fn toggle_liked(&self, item_id: &str) -> Result<bool> {
        let _guard = self.write_guard()?;

        let mut updated = self.liked.borrow().clone();
        let now_liked = if updated.remove(item_id) {
            false
        } else {
            updated.insert(item_id.to_string());
            true
        };
        self.store.save_liked_item_ids(&updated)?;
        self.liked.send_replace(updated);

        debug!(item_id, liked = now_liked, "Toggled like");
        Ok(now_liked)
    }

    pub fn subscribe_seen(&self) -> watch::Receiver<HashSet<i64>> {
        self.seen.subscribe()
    }

    pub fn subscribe_liked(&self) -> watch::Receiver<HashSet<String>> {
        self.liked.subscribe()
    }

    pub fn snapshot(&self) -> InteractionState {
        InteractionState {
            seen_user_ids: self.seen.borrow().clone(),
            liked_item_ids: self.liked.borrow().clone(),
        }
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| StoryError::Other(format!("interaction store poisoned: {}", e)))
    }
}
