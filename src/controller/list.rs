//! Incremental loading for the avatar carousel.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::app::Result;
use crate::content::ContentProvider;
use crate::domain::User;
use crate::interaction::InteractionStore;

/// Positions from the end of the list at which the next page is prefetched.
pub const PREFETCH_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub current_page: u32,
    pub can_load_more: bool,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            current_page: 1,
            can_load_more: true,
        }
    }
}

/// A fetch the list controller needs performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRequest {
    Initial,
    Page(u32),
}

impl ListRequest {
    pub async fn execute(self, provider: &dyn ContentProvider) -> ListResponse {
        let result = match self {
            ListRequest::Initial => provider.fetch_initial_users().await,
            ListRequest::Page(page) => provider.fetch_page(page).await,
        };
        ListResponse {
            request: self,
            result,
        }
    }
}

#[derive(Debug)]
pub struct ListResponse {
    pub request: ListRequest,
    pub result: Result<Vec<User>>,
}

pub struct StoryListController {
    interactions: Arc<InteractionStore>,
    seen: watch::Receiver<HashSet<i64>>,
    users: Vec<User>,
    phase: ListPhase,
    is_loading: bool,
    error: Option<String>,
    cursor: PageCursor,
    selected: usize,
}

impl StoryListController {
    pub fn new(interactions: Arc<InteractionStore>) -> Self {
        let seen = interactions.subscribe_seen();
        Self {
            interactions,
            seen,
            users: Vec::new(),
            phase: ListPhase::Idle,
            is_loading: false,
            error: None,
            cursor: PageCursor::default(),
            selected: 0,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Start loading the first users, replacing the list on success.
    #[must_use]
    pub fn load_initial(&mut self) -> Option<ListRequest> {
        if self.is_loading {
            return None;
        }
        self.begin_loading();
        self.error = None;
        self.cursor = PageCursor::default();
        Some(ListRequest::Initial)
    }

    /// Start loading the next page, appending it on success.
    #[must_use]
    pub fn load_more(&mut self) -> Option<ListRequest> {
        if self.is_loading || !self.cursor.can_load_more {
            return None;
        }
        self.begin_loading();
        self.cursor.current_page += 1;
        Some(ListRequest::Page(self.cursor.current_page))
    }

    /// Prefetch when `anchor_user_id` sits in the last few loaded positions.
    #[must_use]
    pub fn load_more_if_needed(&mut self, anchor_user_id: i64) -> Option<ListRequest> {
        let index = self.users.iter().position(|u| u.id == anchor_user_id)?;
        let threshold = self.users.len().saturating_sub(PREFETCH_THRESHOLD);
        if index >= threshold {
            self.load_more()
        } else {
            None
        }
    }

    /// Apply the result of a request returned earlier.
    pub fn apply(&mut self, response: ListResponse) {
        if !self.is_loading {
            debug!(request = ?response.request, "Ignoring list response with no load in flight");
            return;
        }
        self.is_loading = false;

        match (response.request, response.result) {
            (ListRequest::Initial, Ok(users)) => {
                info!("Loaded {} initial users", users.len());
                self.users = users;
                self.cursor = PageCursor::default();
                self.selected = 0;
                self.phase = ListPhase::Loaded;
            }
            (ListRequest::Page(page), Ok(users)) => {
                info!(page, "Appending {} users", users.len());
                // An empty page is appended as-is; the pool cycles, so it
                // does not end pagination.
                self.users.extend(users);
                self.phase = ListPhase::Loaded;
            }
            (ListRequest::Initial, Err(e)) => {
                self.error = Some(format!("Failed to load stories: {}", e));
                self.phase = ListPhase::Error;
            }
            (ListRequest::Page(_), Err(e)) => {
                self.error = Some(format!("Failed to load more stories: {}", e));
                self.phase = ListPhase::Error;
            }
        }
    }

    /// Execute `request`, if any, against `provider` and apply the result.
    pub async fn complete(&mut self, request: Option<ListRequest>, provider: &dyn ContentProvider) {
        if let Some(request) = request {
            let response = request.execute(provider).await;
            self.apply(response);
        }
    }

    pub fn is_seen(&self, user_id: i64) -> bool {
        self.seen.borrow().contains(&user_id)
    }

    pub fn mark_seen(&self, user_id: i64) {
        if let Err(e) = self.interactions.mark_seen(user_id) {
            error!(user_id, "Failed to persist seen state: {}", e);
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.users.get(self.selected)
    }

    #[must_use]
    pub fn select_next(&mut self) -> Option<ListRequest> {
        if self.selected + 1 < self.users.len() {
            self.selected += 1;
        }
        let anchor = self.selected_user()?.id;
        self.load_more_if_needed(anchor)
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn begin_loading(&mut self) {
        self.is_loading = true;
        self.phase = ListPhase::Loading;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::StoryError;
    use crate::content::{MockProvider, PoolProvider};
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    use crate::domain::Story;

    fn interactions() -> Arc<InteractionStore> {
        Arc::new(InteractionStore::new(Arc::new(MemoryStore::new())))
    }

    fn pool_of(n: i64) -> PoolProvider {
        PoolProvider::from_users((1..=n).map(|id| User::new(id, format!("U{}", id), "")).collect())
    }

    struct FailingProvider;

    #[async_trait]
    impl ContentProvider for FailingProvider {
        async fn fetch_initial_users(&self) -> Result<Vec<User>> {
            Err(StoryError::FetchFailed("offline".into()))
        }

        async fn fetch_page(&self, _page: u32) -> Result<Vec<User>> {
            Err(StoryError::FetchFailed("offline".into()))
        }

        async fn fetch_story(&self, _user_id: i64) -> Result<Story> {
            Err(StoryError::FetchFailed("offline".into()))
        }
    }

    #[tokio::test]
    async fn test_load_initial_replaces_list() {
        let provider = pool_of(3);
        let mut list = StoryListController::new(interactions());
        assert_eq!(list.phase(), ListPhase::Idle);

        let request = list.load_initial();
        assert_eq!(request, Some(ListRequest::Initial));
        assert!(list.is_loading());
        list.complete(request, &provider).await;

        assert_eq!(list.phase(), ListPhase::Loaded);
        assert!(!list.is_loading());
        assert_eq!(list.users().len(), 3);
        assert_eq!(list.cursor(), PageCursor::default());
    }

    #[tokio::test]
    async fn test_load_initial_guarded_while_loading() {
        let mut list = StoryListController::new(interactions());
        assert!(list.load_initial().is_some());
        assert!(list.load_initial().is_none());
        assert!(list.load_more().is_none());
    }

    #[tokio::test]
    async fn test_load_more_appends_next_page() {
        let provider = pool_of(25);
        let mut list = StoryListController::new(interactions());
        let request = list.load_initial();
        list.complete(request, &provider).await;
        assert_eq!(list.users().len(), 20);

        let request = list.load_more();
        assert_eq!(request, Some(ListRequest::Page(2)));
        list.complete(request, &provider).await;

        assert_eq!(list.users().len(), 30);
        assert_eq!(list.cursor().current_page, 2);
        // Page 2 starts at pool offset 10.
        assert_eq!(list.users()[20].id, 11);
    }

    #[tokio::test]
    async fn test_empty_page_does_not_stop_pagination() {
        let provider = PoolProvider::from_users(Vec::new());
        let mut list = StoryListController::new(interactions());

        let request = list.load_more();
        list.complete(request, &provider).await;

        assert!(list.users().is_empty());
        assert!(list.cursor().can_load_more);
        assert_eq!(list.load_more(), Some(ListRequest::Page(3)));
    }

    #[tokio::test]
    async fn test_initial_failure_keeps_list_and_sets_error() {
        let mut list = StoryListController::new(interactions());
        let request = list.load_initial();
        list.complete(request, &pool_of(4)).await;

        let request = list.load_initial();
        list.complete(request, &FailingProvider).await;

        assert_eq!(list.phase(), ListPhase::Error);
        assert!(!list.is_loading());
        assert_eq!(list.users().len(), 4);
        assert_eq!(
            list.error(),
            Some("Failed to load stories: Fetch failed: offline")
        );
    }

    #[tokio::test]
    async fn test_empty_pool_initial_load_reports_unavailable() {
        let mut list = StoryListController::new(interactions());
        let request = list.load_initial();
        list.complete(request, &PoolProvider::from_users(Vec::new())).await;

        assert_eq!(list.phase(), ListPhase::Error);
        assert!(list.error().unwrap().starts_with("Failed to load stories"));
    }

    #[tokio::test]
    async fn test_load_more_failure_leaves_list_unchanged() {
        let mut list = StoryListController::new(interactions());
        let request = list.load_initial();
        list.complete(request, &MockProvider::new()).await;

        let request = list.load_more();
        list.complete(request, &FailingProvider).await;

        assert_eq!(list.users().len(), 3);
        assert!(!list.is_loading());
        assert!(list
            .error()
            .unwrap()
            .starts_with("Failed to load more stories"));
    }

    #[tokio::test]
    async fn test_load_more_if_needed_threshold() {
        let provider = pool_of(10);
        let mut list = StoryListController::new(interactions());
        let request = list.load_initial();
        list.complete(request, &provider).await;
        let count = list.users().len();
        assert_eq!(count, 10);

        let far_anchor = list.users()[count - 10].id;
        assert!(list.load_more_if_needed(far_anchor).is_none());

        let near_anchor = list.users()[count - 3].id;
        assert_eq!(
            list.load_more_if_needed(near_anchor),
            Some(ListRequest::Page(2))
        );
    }

    #[tokio::test]
    async fn test_load_more_if_needed_unknown_anchor() {
        let mut list = StoryListController::new(interactions());
        let request = list.load_initial();
        list.complete(request, &pool_of(3)).await;
        assert!(list.load_more_if_needed(999).is_none());
    }

    #[tokio::test]
    async fn test_seen_status_reflects_store() {
        let store = interactions();
        let list = StoryListController::new(store.clone());
        assert!(!list.is_seen(2));

        store.mark_seen(2).unwrap();
        assert!(list.is_seen(2));

        list.mark_seen(3);
        assert!(store.is_seen(3));
        assert!(list.is_seen(3));
    }

    #[tokio::test]
    async fn test_selection_prefetches_near_end() {
        let provider = pool_of(8);
        let mut list = StoryListController::new(interactions());
        let request = list.load_initial();
        list.complete(request, &provider).await;

        // Positions 0..=2 are outside the last five of eight.
        assert!(list.select_next().is_none());
        assert!(list.select_next().is_none());
        assert_eq!(list.select_next(), Some(ListRequest::Page(2)));
        assert_eq!(list.selected_index(), 3);

        list.select_previous();
        assert_eq!(list.selected_index(), 2);
    }
}
