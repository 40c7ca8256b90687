use serde::{Deserialize, Serialize};

/// Number of items synthesized for every story.
pub const ITEMS_PER_STORY: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: String,
    pub image_url: String,
}

impl StoryItem {
    /// Build the item at `sequence` (1-based) of `user_id`'s story.
    ///
    /// Both the ID and the image URL are a pure function of the inputs, so the
    /// same user always gets the same items. Returns `None` when the image ID
    /// does not fit in an `i64`.
    pub fn synthesize(user_id: i64, sequence: usize) -> Option<Self> {
        let image_id = user_id
            .checked_mul(10)?
            .checked_add(i64::try_from(sequence).ok()?)?;
        Some(Self {
            id: format!("{}-{}", user_id, sequence),
            image_url: format!("https://picsum.photos/id/{}/400/600", image_id),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub user_id: i64,
    pub items: Vec<StoryItem>,
}

impl Story {
    pub fn synthesize(user_id: i64) -> Option<Self> {
        let items = (1..=ITEMS_PER_STORY)
            .map(|sequence| StoryItem::synthesize(user_id, sequence))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { user_id, items })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
