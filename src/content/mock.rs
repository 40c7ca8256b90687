use async_trait::async_trait;

use crate::app::{Result, StoryError};
use crate::content::{synthesize_story, ContentProvider, USERS_PER_PAGE};
use crate::domain::{Story, User};

/// Fixed in-memory content for previews and tests.
#[derive(Debug, Clone, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }

    fn avatar(id: i64) -> String {
        format!("https://i.pravatar.cc/150?u={}", id)
    }
}

#[async_trait]
impl ContentProvider for MockProvider {
    async fn fetch_initial_users(&self) -> Result<Vec<User>> {
        Ok(vec![
            User::new(1, "Neo", Self::avatar(1)),
            User::new(2, "Trinity", Self::avatar(2)),
            User::new(3, "Morpheus", Self::avatar(3)),
        ])
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<User>> {
        if page == 0 {
            return Err(StoryError::FetchFailed("pages start at 1".into()));
        }
        let base = (page as i64 - 1) * USERS_PER_PAGE as i64;
        Ok((1..=USERS_PER_PAGE as i64)
            .map(|i| {
                let id = base + i;
                User::new(id, format!("User {}", id), Self::avatar(id))
            })
            .collect())
    }

    async fn fetch_story(&self, user_id: i64) -> Result<Story> {
        synthesize_story(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_pages_are_sequential() {
        let provider = MockProvider::new();
        let page = provider.fetch_page(2).await.unwrap();
        assert_eq!(page.first().map(|u| u.id), Some(11));
        assert_eq!(page.last().map(|u| u.id), Some(20));
    }

    #[tokio::test]
    async fn test_mock_rejects_page_zero() {
        let provider = MockProvider::new();
        assert!(matches!(
            provider.fetch_page(0).await,
            Err(StoryError::FetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_initial_users() {
        let users = MockProvider::new().fetch_initial_users().await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Neo", "Trinity", "Morpheus"]);
    }
}
