pub mod memory;
pub mod sqlite;

use std::collections::HashSet;

use crate::app::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Local key-value persistence for the interaction sets.
///
/// A missing entry loads as an empty set. A present but unreadable entry is an
/// error; callers decide how to recover.
pub trait Store: Send + Sync {
    fn load_seen_user_ids(&self) -> Result<HashSet<i64>>;
    fn save_seen_user_ids(&self, ids: &HashSet<i64>) -> Result<()>;

    fn load_liked_item_ids(&self) -> Result<HashSet<String>>;
    fn save_liked_item_ids(&self, ids: &HashSet<String>) -> Result<()>;
}
