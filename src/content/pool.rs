use async_trait::async_trait;
use tracing::{info, warn};

use crate::app::{Result, StoryError};
use crate::content::{
    synthesize_story, ContentProvider, UserSource, INITIAL_USER_COUNT, USERS_PER_PAGE,
};
use crate::domain::{Story, User};

/// Serves pages cyclically over a fixed pool loaded once at construction.
pub struct PoolProvider {
    pool: Vec<User>,
}

impl PoolProvider {
    /// Load the pool from `source`. A source that cannot be read leaves the
    /// provider permanently empty.
    pub fn new(source: &UserSource) -> Self {
        let pool = match source.load() {
            Ok(pool) => {
                info!("Loaded {} users into the pool", pool.len());
                pool
            }
            Err(e) => {
                warn!("User source unavailable, starting with an empty pool: {}", e);
                Vec::new()
            }
        };
        Self { pool }
    }

    pub fn from_users(pool: Vec<User>) -> Self {
        Self { pool }
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    fn page(&self, page: u32) -> Result<Vec<User>> {
        if page == 0 {
            return Err(StoryError::FetchFailed("pages start at 1".into()));
        }
        if self.pool.is_empty() {
            return Ok(Vec::new());
        }

        let start = (page as usize - 1) * USERS_PER_PAGE;
        let users = (0..USERS_PER_PAGE)
            .map(|offset| self.pool[(start + offset) % self.pool.len()].clone())
            .collect();
        Ok(users)
    }
}

#[async_trait]
impl ContentProvider for PoolProvider {
    async fn fetch_initial_users(&self) -> Result<Vec<User>> {
        if self.pool.is_empty() {
            return Err(StoryError::DataUnavailable);
        }
        let count = self.pool.len().min(INITIAL_USER_COUNT);
        Ok(self.pool[..count].to_vec())
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<User>> {
        self.page(page)
    }

    async fn fetch_story(&self, user_id: i64) -> Result<Story> {
        synthesize_story(user_id)
    }
}
