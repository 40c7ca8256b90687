pub mod mock;
pub mod pool;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::app::{Result, StoryError};
use crate::domain::{Story, User, UserPagesDocument};

pub use mock::MockProvider;
pub use pool::PoolProvider;

/// Maximum number of users returned by the initial load.
pub const INITIAL_USER_COUNT: usize = 20;

/// Number of users in every page after the initial load.
pub const USERS_PER_PAGE: usize = 10;

const BUNDLED_USERS: &str = include_str!("../../data/users.json");

/// Supplies users and stories to the controllers.
///
/// Implementations may do I/O; callers always go through the async
/// interface even when the data is already in memory.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn fetch_initial_users(&self) -> Result<Vec<User>>;

    /// Fetch a 1-based page of users.
    async fn fetch_page(&self, page: u32) -> Result<Vec<User>>;

    async fn fetch_story(&self, user_id: i64) -> Result<Story>;
}

/// Where the static user pool comes from.
#[derive(Debug, Clone)]
pub enum UserSource {
    /// The document compiled into the binary.
    Bundled,
    /// A `{ "pages": [...] }` document on disk.
    File(PathBuf),
    /// Users supplied directly, mostly for tests.
    Inline(Vec<User>),
}

impl UserSource {
    pub fn load(&self) -> Result<Vec<User>> {
        match self {
            UserSource::Bundled => parse_document(BUNDLED_USERS),
            UserSource::File(path) => {
                let content = std::fs::read_to_string(path)?;
                parse_document(&content)
            }
            UserSource::Inline(users) => Ok(users.clone()),
        }
    }
}

/// The deterministic story every provider serves for `user_id`.
fn synthesize_story(user_id: i64) -> Result<Story> {
    Story::synthesize(user_id)
        .ok_or_else(|| StoryError::FetchFailed(format!("no story for user {}", user_id)))
}

fn parse_document(content: &str) -> Result<Vec<User>> {
    let doc: UserPagesDocument = serde_json::from_str(content)?;
    Ok(doc.into_pool())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_document_parses() {
        let users = UserSource::Bundled.load().unwrap();
        assert!(users.len() > INITIAL_USER_COUNT);
    }

    #[test]
    fn test_story_for_out_of_range_user_fails() {
        assert!(matches!(
            synthesize_story(i64::MAX),
            Err(StoryError::FetchFailed(_))
        ));
        assert_eq!(synthesize_story(7).unwrap().items.len(), 3);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let source = UserSource::File(PathBuf::from("/nonexistent/users.json"));
        assert!(source.load().is_err());
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"{"pages": [{"users": [{"id": 42, "name": "Zed", "profile_picture_url": "z"}]}]}"#,
        )
        .unwrap();

        let users = UserSource::File(path).load().unwrap();
        assert_eq!(users, vec![User::new(42, "Zed", "z")]);
    }
}
