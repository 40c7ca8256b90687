use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Keys of the two persisted entries.
pub const SEEN_USER_IDS_KEY: &str = "seenStoryUserIds";
pub const LIKED_ITEM_IDS_KEY: &str = "likedStoryItemIds";

/// Point-in-time copy of the seen and liked sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionState {
    pub seen_user_ids: HashSet<i64>,
    pub liked_item_ids: HashSet<String>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seen IDs in ascending order, for stable display.
    pub fn sorted_seen(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.seen_user_ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Liked IDs in lexical order, for stable display.
    pub fn sorted_liked(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.liked_item_ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}
