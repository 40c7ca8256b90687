pub mod state;
pub mod story;
pub mod user;

pub use state::{InteractionState, LIKED_ITEM_IDS_KEY, SEEN_USER_IDS_KEY};
pub use story::{Story, StoryItem, ITEMS_PER_STORY};
pub use user::{User, UserPage, UserPagesDocument};
