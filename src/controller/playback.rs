//! Full-screen story playback: timed auto-advance and navigation.
//!
//! The controller never awaits. Operations that need a story return a
//! [`StoryRequest`]; the caller executes it and feeds the
//! [`StoryResponse`] back through [`StoryPlaybackController::apply_story`].
//! Responses carry the load generation they were issued for, so a response
//! that arrives after a newer load started is dropped.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::app::Result;
use crate::content::ContentProvider;
use crate::controller::timer::{PlaybackTimer, TimerTick};
use crate::domain::{Story, StoryItem, User};
use crate::interaction::InteractionStore;

pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Seconds each item stays on screen.
pub const STORY_DURATION_SECS: f64 = 3.0;

pub const PROGRESS_PER_TICK: f64 = 0.05 / STORY_DURATION_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    LoadingStory,
    Playing(usize),
    Paused(usize),
    /// Stepped back past the first user; the timer is off until the next
    /// navigation.
    Stopped(usize),
    Error,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackCursor {
    pub user_index: usize,
    pub item_index: usize,
    pub progress: f64,
    pub paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryRequest {
    pub generation: u64,
    pub user_id: i64,
}

impl StoryRequest {
    pub async fn execute(self, provider: &dyn ContentProvider) -> StoryResponse {
        StoryResponse {
            generation: self.generation,
            user_id: self.user_id,
            result: provider.fetch_story(self.user_id).await,
        }
    }
}

#[derive(Debug)]
pub struct StoryResponse {
    pub generation: u64,
    pub user_id: i64,
    pub result: Result<Story>,
}

pub struct StoryPlaybackController {
    users: Vec<User>,
    interactions: Arc<InteractionStore>,
    liked: watch::Receiver<HashSet<String>>,
    cursor: PlaybackCursor,
    story: Option<Story>,
    is_loading: bool,
    error: Option<String>,
    finished: bool,
    generation: u64,
    timer: Option<PlaybackTimer>,
    timer_epoch: u64,
    ticks: Option<mpsc::UnboundedSender<TimerTick>>,
}

impl StoryPlaybackController {
    /// Start at `initial_user_id`, or at the first user if it is not loaded.
    ///
    /// Without a tick sink the timer is manual and [`tick`](Self::tick)
    /// drives progress.
    pub fn new(users: Vec<User>, initial_user_id: i64, interactions: Arc<InteractionStore>) -> Self {
        let user_index = users
            .iter()
            .position(|u| u.id == initial_user_id)
            .unwrap_or(0);
        let liked = interactions.subscribe_liked();

        Self {
            users,
            interactions,
            liked,
            cursor: PlaybackCursor {
                user_index,
                item_index: 0,
                progress: 0.0,
                paused: false,
            },
            story: None,
            is_loading: false,
            error: None,
            finished: false,
            generation: 0,
            timer: None,
            timer_epoch: 0,
            ticks: None,
        }
    }

    /// Deliver timer ticks to `sink` from a spawned task instead of driving
    /// them manually.
    pub fn with_tick_sink(mut self, sink: mpsc::UnboundedSender<TimerTick>) -> Self {
        self.ticks = Some(sink);
        self
    }

    /// Load the story of the starting user.
    #[must_use]
    pub fn start(&mut self) -> Option<StoryRequest> {
        if self.users.is_empty() {
            self.finished = true;
            return None;
        }
        self.load_story(self.cursor.user_index)
    }

    #[must_use]
    pub fn load_story(&mut self, user_index: usize) -> Option<StoryRequest> {
        if self.is_loading {
            return None;
        }
        let user_id = self.users.get(user_index)?.id;

        self.stop_timer();
        self.is_loading = true;
        self.error = None;
        self.finished = false;
        self.story = None;
        self.cursor.user_index = user_index;
        self.cursor.item_index = 0;
        self.cursor.progress = 0.0;
        self.generation += 1;

        debug!(user_id, generation = self.generation, "Loading story");
        Some(StoryRequest {
            generation: self.generation,
            user_id,
        })
    }

    pub fn apply_story(&mut self, response: StoryResponse) {
        if response.generation != self.generation {
            debug!(
                user_id = response.user_id,
                generation = response.generation,
                "Discarding superseded story response"
            );
            return;
        }
        self.is_loading = false;

        match response.result {
            Ok(story) => {
                info!(user_id = story.user_id, items = story.items.len(), "Story loaded");
                self.story = Some(story);
                self.mark_current_user_seen();
                self.start_timer();
            }
            Err(e) => {
                self.error = Some(format!("Failed to load story: {}", e));
                self.stop_timer();
            }
        }
    }

    /// Execute `request`, if any, against `provider` and apply the result.
    pub async fn complete(&mut self, request: Option<StoryRequest>, provider: &dyn ContentProvider) {
        if let Some(request) = request {
            let response = request.execute(provider).await;
            self.apply_story(response);
        }
    }

    /// Advance progress by one tick of the running timer.
    ///
    /// No-op when the timer is stopped or playback is paused.
    #[must_use]
    pub fn tick(&mut self) -> Option<StoryRequest> {
        if self.timer.is_none() || self.cursor.paused {
            return None;
        }
        self.cursor.progress += PROGRESS_PER_TICK;
        if self.cursor.progress >= 1.0 {
            return self.next_item();
        }
        None
    }

    /// Handle a tick from a spawned timer, ignoring ticks from stopped ones.
    #[must_use]
    pub fn handle_tick(&mut self, tick: TimerTick) -> Option<StoryRequest> {
        match &self.timer {
            Some(timer) if timer.accepts(tick) => self.tick(),
            _ => None,
        }
    }

    #[must_use]
    pub fn next_item(&mut self) -> Option<StoryRequest> {
        let count = self.story.as_ref()?.items.len();
        if self.cursor.item_index + 1 < count {
            self.cursor.item_index += 1;
            self.start_timer();
            None
        } else {
            self.next_user()
        }
    }

    #[must_use]
    pub fn previous_item(&mut self) -> Option<StoryRequest> {
        self.story.as_ref()?;
        if self.cursor.item_index > 0 {
            self.cursor.item_index -= 1;
            self.start_timer();
            None
        } else {
            self.previous_user()
        }
    }

    #[must_use]
    pub fn next_user(&mut self) -> Option<StoryRequest> {
        if self.is_loading {
            return None;
        }
        if self.cursor.user_index + 1 >= self.users.len() {
            self.stop_timer();
            self.finished = true;
            return None;
        }
        self.load_story(self.cursor.user_index + 1)
    }

    #[must_use]
    pub fn previous_user(&mut self) -> Option<StoryRequest> {
        if self.is_loading {
            return None;
        }
        if self.cursor.user_index == 0 {
            self.stop_timer();
            return None;
        }
        self.load_story(self.cursor.user_index - 1)
    }

    pub fn pause(&mut self) {
        self.cursor.paused = true;
    }

    pub fn resume(&mut self) {
        self.cursor.paused = false;
    }

    pub fn is_current_item_liked(&self) -> bool {
        match self.current_item() {
            Some(item) => self.liked.borrow().contains(&item.id),
            None => false,
        }
    }

    pub fn toggle_like_for_current_item(&mut self) {
        let Some(item_id) = self.current_item().map(|item| item.id.clone()) else {
            return;
        };
        if let Err(e) = self.interactions.toggle_liked(&item_id) {
            error!(item_id = %item_id, "Failed to persist like: {}", e);
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        if self.is_loading {
            PlaybackPhase::LoadingStory
        } else if self.error.is_some() {
            PlaybackPhase::Error
        } else if self.finished {
            PlaybackPhase::Finished
        } else if self.story.is_none() {
            PlaybackPhase::LoadingStory
        } else if self.timer.is_none() {
            PlaybackPhase::Stopped(self.cursor.item_index)
        } else if self.cursor.paused {
            PlaybackPhase::Paused(self.cursor.item_index)
        } else {
            PlaybackPhase::Playing(self.cursor.item_index)
        }
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn progress(&self) -> f64 {
        self.cursor.progress
    }

    pub fn is_paused(&self) -> bool {
        self.cursor.paused
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.users.get(self.cursor.user_index)
    }

    pub fn current_item(&self) -> Option<&StoryItem> {
        self.story.as_ref()?.items.get(self.cursor.item_index)
    }

    /// Fill level of each item's progress segment.
    pub fn segments(&self) -> Vec<f64> {
        let Some(story) = &self.story else {
            return Vec::new();
        };
        (0..story.items.len())
            .map(|index| match index.cmp(&self.cursor.item_index) {
                std::cmp::Ordering::Less => 1.0,
                std::cmp::Ordering::Equal => self.cursor.progress.min(1.0),
                std::cmp::Ordering::Greater => 0.0,
            })
            .collect()
    }

    fn start_timer(&mut self) {
        self.stop_timer();
        self.finished = false;
        self.cursor.progress = 0.0;
        self.cursor.paused = false;
        self.timer_epoch += 1;

        self.timer = Some(match &self.ticks {
            Some(sink) => PlaybackTimer::spawn(self.timer_epoch, TICK_INTERVAL, sink.clone()),
            None => PlaybackTimer::manual(self.timer_epoch),
        });
    }

    fn stop_timer(&mut self) {
        self.timer = None;
    }

    fn mark_current_user_seen(&self) {
        let Some(user) = self.current_user() else {
            return;
        };
        if let Err(e) = self.interactions.mark_seen(user.id) {
            error!(user_id = user.id, "Failed to persist seen state: {}", e);
        }
    }
}

impl Drop for StoryPlaybackController {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::StoryError;
    use crate::content::PoolProvider;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    fn users(n: i64) -> Vec<User> {
        (1..=n).map(|id| User::new(id, format!("U{}", id), "")).collect()
    }

    fn interactions() -> Arc<InteractionStore> {
        Arc::new(InteractionStore::new(Arc::new(MemoryStore::new())))
    }

    async fn started(n: i64, initial: i64, store: Arc<InteractionStore>) -> StoryPlaybackController {
        let provider = PoolProvider::from_users(users(n));
        let mut playback = StoryPlaybackController::new(users(n), initial, store);
        let request = playback.start();
        playback.complete(request, &provider).await;
        playback
    }

    /// Tick until the item index changes or the timer stops.
    fn tick_through_item(playback: &mut StoryPlaybackController) -> Option<StoryRequest> {
        let start = playback.cursor().item_index;
        for _ in 0..100 {
            let request = playback.tick();
            if request.is_some()
                || playback.cursor().item_index != start
                || !playback.is_timer_running()
            {
                return request;
            }
        }
        panic!("item never advanced");
    }

    struct FailingProvider;

    #[async_trait]
    impl ContentProvider for FailingProvider {
        async fn fetch_initial_users(&self) -> Result<Vec<User>> {
            Ok(Vec::new())
        }

        async fn fetch_page(&self, _page: u32) -> Result<Vec<User>> {
            Ok(Vec::new())
        }

        async fn fetch_story(&self, _user_id: i64) -> Result<Story> {
            Err(StoryError::FetchFailed("timeout".into()))
        }
    }

    #[tokio::test]
    async fn test_starts_at_initial_user_and_marks_seen() {
        let store = interactions();
        let playback = started(5, 3, store.clone()).await;

        assert_eq!(playback.cursor().user_index, 2);
        assert_eq!(playback.phase(), PlaybackPhase::Playing(0));
        assert!(playback.is_timer_running());
        assert!(store.is_seen(3));
        assert!(!store.is_seen(1));
    }

    #[tokio::test]
    async fn test_unknown_initial_user_falls_back_to_first() {
        let playback = started(4, 404, interactions()).await;
        assert_eq!(playback.current_user().map(|u| u.id), Some(1));
    }

    #[tokio::test]
    async fn test_tick_accumulates_progress() {
        let mut playback = started(2, 1, interactions()).await;
        for _ in 0..3 {
            assert!(playback.tick().is_none());
        }
        assert!((playback.progress() - 3.0 * PROGRESS_PER_TICK).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_auto_advance_resets_progress() {
        let mut playback = started(2, 1, interactions()).await;
        assert!(playback.tick().is_none());

        assert!(tick_through_item(&mut playback).is_none());
        assert_eq!(playback.cursor().item_index, 1);
        assert_eq!(playback.progress(), 0.0);
    }

    #[tokio::test]
    async fn test_item_lasts_story_duration() {
        let mut playback = started(2, 1, interactions()).await;
        let mut ticks = 0;
        while playback.cursor().item_index == 0 {
            let _ = playback.tick();
            ticks += 1;
        }
        let expected = (STORY_DURATION_SECS / 0.05).round() as i32;
        assert!((ticks - expected).abs() <= 1, "took {} ticks", ticks);
    }

    #[tokio::test]
    async fn test_last_item_moves_to_next_user() {
        let provider = PoolProvider::from_users(users(3));
        let store = interactions();
        let mut playback = started(3, 1, store.clone()).await;

        assert!(playback.next_item().is_none());
        assert!(playback.next_item().is_none());
        let request = playback.next_item();
        assert_eq!(request.map(|r| r.user_id), Some(2));
        assert_eq!(playback.phase(), PlaybackPhase::LoadingStory);
        assert!(!playback.is_timer_running());

        playback.complete(request, &provider).await;
        assert_eq!(playback.current_user().map(|u| u.id), Some(2));
        assert_eq!(playback.cursor().item_index, 0);
        assert!(store.is_seen(2));
    }

    #[tokio::test]
    async fn test_previous_item_at_first_goes_to_previous_user() {
        let provider = PoolProvider::from_users(users(3));
        let mut playback = started(3, 2, interactions()).await;

        let request = playback.previous_item();
        assert_eq!(request.map(|r| r.user_id), Some(1));
        playback.complete(request, &provider).await;
        assert_eq!(playback.cursor().user_index, 0);

        assert!(playback.next_item().is_none());
        assert!(playback.previous_item().is_none());
        assert_eq!(playback.cursor().item_index, 0);
        assert!(playback.is_timer_running());
    }

    #[tokio::test]
    async fn test_end_of_last_user_stops_timer() {
        let mut playback = started(2, 2, interactions()).await;
        assert!(playback.next_item().is_none());
        assert!(playback.next_item().is_none());
        assert_eq!(playback.cursor().item_index, 2);

        assert!(playback.next_item().is_none());
        assert!(playback.next_user().is_none());

        assert!(!playback.is_timer_running());
        assert_eq!(playback.phase(), PlaybackPhase::Finished);
        let progress = playback.progress();
        for _ in 0..10 {
            assert!(playback.tick().is_none());
        }
        assert_eq!(playback.progress(), progress);
    }

    #[tokio::test]
    async fn test_stepping_back_from_the_end_resumes_playback() {
        let mut playback = started(2, 2, interactions()).await;
        for _ in 0..3 {
            assert!(playback.next_item().is_none());
        }
        assert_eq!(playback.phase(), PlaybackPhase::Finished);

        assert!(playback.previous_item().is_none());
        assert_eq!(playback.phase(), PlaybackPhase::Playing(1));
        assert!(playback.is_timer_running());
        assert!(playback.tick().is_none());
        assert!((playback.progress() - PROGRESS_PER_TICK).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_next_user_while_last_story_loads_does_not_finish() {
        let provider = PoolProvider::from_users(users(2));
        let mut playback = StoryPlaybackController::new(users(2), 2, interactions());
        let request = playback.start();

        assert!(playback.next_user().is_none());
        assert!(playback.previous_user().is_none());
        assert_eq!(playback.phase(), PlaybackPhase::LoadingStory);

        playback.complete(request, &provider).await;
        assert_eq!(playback.phase(), PlaybackPhase::Playing(0));
        assert_eq!(playback.cursor().user_index, 1);
    }

    #[tokio::test]
    async fn test_previous_user_at_first_stops_timer() {
        let mut playback = started(2, 1, interactions()).await;
        assert!(playback.previous_user().is_none());
        assert!(!playback.is_timer_running());
        assert_eq!(playback.cursor().user_index, 0);
        assert_eq!(playback.phase(), PlaybackPhase::Stopped(0));

        assert!(playback.next_item().is_none());
        assert_eq!(playback.phase(), PlaybackPhase::Playing(1));
    }

    #[tokio::test]
    async fn test_pause_freezes_progress() {
        let mut playback = started(2, 1, interactions()).await;
        let _ = playback.tick();
        let before = playback.progress();

        playback.pause();
        assert_eq!(playback.phase(), PlaybackPhase::Paused(0));
        for _ in 0..5 {
            assert!(playback.tick().is_none());
        }
        assert_eq!(playback.progress(), before);
        assert!(playback.is_timer_running());

        playback.resume();
        let _ = playback.tick();
        assert!((playback.progress() - (before + PROGRESS_PER_TICK)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_navigation_clears_pause() {
        let mut playback = started(2, 1, interactions()).await;
        playback.pause();
        let _ = playback.next_item();
        assert!(!playback.is_paused());
        assert_eq!(playback.phase(), PlaybackPhase::Playing(1));
    }

    #[tokio::test]
    async fn test_load_guarded_while_in_flight() {
        let mut playback = StoryPlaybackController::new(users(3), 1, interactions());
        let first = playback.start();
        assert!(first.is_some());
        assert!(playback.load_story(2).is_none());
        assert!(playback.next_user().is_none());
        assert_eq!(playback.cursor().user_index, 0);
    }

    #[tokio::test]
    async fn test_superseded_response_is_discarded() {
        let provider = PoolProvider::from_users(users(3));
        let mut playback = StoryPlaybackController::new(users(3), 1, interactions());

        let stale = playback.start().unwrap();
        let stale_response = stale.execute(&provider).await;
        playback.apply_story(stale_response);

        let fresh = playback.next_user().unwrap();
        let late = StoryResponse {
            generation: stale.generation,
            user_id: stale.user_id,
            result: Ok(Story::synthesize(stale.user_id).unwrap()),
        };
        playback.apply_story(late);
        assert_eq!(playback.phase(), PlaybackPhase::LoadingStory);

        playback.complete(Some(fresh), &provider).await;
        assert_eq!(playback.story().map(|s| s.user_id), Some(2));
    }

    #[tokio::test]
    async fn test_failed_load_surfaces_error() {
        let mut playback = StoryPlaybackController::new(users(2), 1, interactions());
        let request = playback.start();
        playback.complete(request, &FailingProvider).await;

        assert_eq!(playback.phase(), PlaybackPhase::Error);
        assert_eq!(
            playback.error(),
            Some("Failed to load story: Fetch failed: timeout")
        );
        assert!(!playback.is_timer_running());
        assert!(playback.next_item().is_none());
    }

    #[tokio::test]
    async fn test_like_current_item() {
        let store = interactions();
        let mut playback = started(2, 2, store.clone()).await;
        assert!(!playback.is_current_item_liked());

        playback.toggle_like_for_current_item();
        assert!(playback.is_current_item_liked());
        assert!(store.is_liked("2-1"));

        let _ = playback.next_item();
        assert!(!playback.is_current_item_liked());

        let _ = playback.previous_item();
        playback.toggle_like_for_current_item();
        assert!(!store.is_liked("2-1"));
    }

    #[tokio::test]
    async fn test_like_without_story_is_noop() {
        let store = interactions();
        let mut playback = StoryPlaybackController::new(users(2), 1, store.clone());
        playback.toggle_like_for_current_item();
        assert!(!playback.is_current_item_liked());
        assert!(store.snapshot().liked_item_ids.is_empty());
    }

    #[tokio::test]
    async fn test_empty_user_list_finishes_immediately() {
        let mut playback = StoryPlaybackController::new(Vec::new(), 1, interactions());
        assert!(playback.start().is_none());
        assert_eq!(playback.phase(), PlaybackPhase::Finished);
    }

    #[tokio::test]
    async fn test_segments() {
        let mut playback = started(2, 1, interactions()).await;
        let _ = playback.next_item();
        let _ = playback.tick();
        let segments = playback.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], 1.0);
        assert!((segments[1] - PROGRESS_PER_TICK).abs() < 1e-9);
        assert_eq!(segments[2], 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_ticks_drive_progress_and_stale_ticks_are_ignored() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let provider = PoolProvider::from_users(users(2));
        let mut playback =
            StoryPlaybackController::new(users(2), 1, interactions()).with_tick_sink(tx);
        let request = playback.start();
        playback.complete(request, &provider).await;

        tokio::time::sleep(Duration::from_millis(120)).await;
        let mut stale = None;
        while let Ok(tick) = rx.try_recv() {
            stale = Some(tick);
            let _ = playback.handle_tick(tick);
        }
        assert!((playback.progress() - 2.0 * PROGRESS_PER_TICK).abs() < 1e-9);

        // Moving to the next item restarts the timer under a new epoch.
        let _ = playback.next_item();
        let _ = playback.handle_tick(stale.unwrap());
        assert_eq!(playback.progress(), 0.0);
    }
}
