use std::sync::Arc;

use tokio::sync::mpsc;

use crate::controller::{
    PlaybackPhase, StoryListController, StoryPlaybackController, StoryRequest, StoryResponse,
    TimerTick,
};
use crate::interaction::InteractionStore;

/// Width in columns of one avatar slot in the carousel.
pub const AVATAR_WIDTH: u16 = 14;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Carousel,
    Viewer,
}

pub struct TuiApp {
    pub list: StoryListController,
    pub viewer: Option<StoryPlaybackController>,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Index of the first avatar drawn in the carousel.
    pub carousel_offset: usize,
    frame: usize,
    /// Bumped whenever the viewer closes so late story responses are dropped.
    session: u64,
    ticks: Option<mpsc::UnboundedReceiver<TimerTick>>,
    interactions: Arc<InteractionStore>,
}

impl TuiApp {
    pub fn new(interactions: Arc<InteractionStore>) -> Self {
        Self {
            list: StoryListController::new(interactions.clone()),
            viewer: None,
            should_quit: false,
            status_message: None,
            carousel_offset: 0,
            frame: 0,
            session: 0,
            ticks: None,
            interactions,
        }
    }

    pub fn screen(&self) -> Screen {
        if self.viewer.is_some() {
            Screen::Viewer
        } else {
            Screen::Carousel
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Open the viewer on the selected avatar, seeded with every loaded user.
    ///
    /// Each viewer gets its own tick channel, so ticks from a closed viewer
    /// never reach the next one.
    #[must_use]
    pub fn open_selected(&mut self) -> Option<StoryRequest> {
        let user_id = self.list.selected_user()?.id;
        let (tx, rx) = mpsc::unbounded_channel();
        let mut viewer = StoryPlaybackController::new(
            self.list.users().to_vec(),
            user_id,
            self.interactions.clone(),
        )
        .with_tick_sink(tx);
        let request = viewer.start();
        self.viewer = Some(viewer);
        self.ticks = Some(rx);
        self.clear_status();
        request
    }

    /// Drop the viewer, which stops its timer.
    pub fn close_viewer(&mut self) {
        self.viewer = None;
        self.ticks = None;
        self.session += 1;
    }

    /// Feed pending timer ticks to the viewer.
    #[must_use]
    pub fn drain_ticks(&mut self) -> Vec<StoryRequest> {
        let mut requests = Vec::new();
        let (Some(viewer), Some(ticks)) = (self.viewer.as_mut(), self.ticks.as_mut()) else {
            return requests;
        };
        while let Ok(tick) = ticks.try_recv() {
            requests.extend(viewer.handle_tick(tick));
        }
        requests
    }

    /// Hand a story response to the viewer of the session that requested it.
    pub fn apply_story(&mut self, session: u64, response: StoryResponse) {
        if session != self.session {
            return;
        }
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.apply_story(response);
        }
    }

    /// Close the viewer once playback has run past the last user.
    pub fn close_viewer_if_finished(&mut self) {
        let finished = self
            .viewer
            .as_ref()
            .is_some_and(|v| v.phase() == PlaybackPhase::Finished);
        if finished {
            self.close_viewer();
            self.set_status("You're all caught up".to_string());
        }
    }

    /// Keep the selected avatar inside a window of `slots` avatars.
    pub fn scroll_to_selection(&mut self, slots: usize) {
        let slots = slots.max(1);
        let selected = self.list.selected_index();
        if selected < self.carousel_offset {
            self.carousel_offset = selected;
        } else if selected >= self.carousel_offset + slots {
            self.carousel_offset = selected + 1 - slots;
        }
    }

    pub fn advance_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn spinner(&self) -> char {
        SPINNER[(self.frame / 4) % SPINNER.len()]
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PoolProvider;
    use crate::domain::User;
    use crate::store::MemoryStore;

    fn app() -> TuiApp {
        TuiApp::new(Arc::new(InteractionStore::new(Arc::new(MemoryStore::new()))))
    }

    async fn loaded(n: i64) -> TuiApp {
        let provider =
            PoolProvider::from_users((1..=n).map(|id| User::new(id, format!("U{}", id), "")).collect());
        let mut app = app();
        let request = app.list.load_initial();
        app.list.complete(request, &provider).await;
        app
    }

    #[tokio::test]
    async fn test_open_selected_starts_viewer_at_selection() {
        let mut app = loaded(4).await;
        let _ = app.list.select_next();

        let request = app.open_selected();
        assert_eq!(request.map(|r| r.user_id), Some(2));
        assert_eq!(app.screen(), Screen::Viewer);

        app.close_viewer();
        assert_eq!(app.screen(), Screen::Carousel);
    }

    #[tokio::test]
    async fn test_story_from_closed_session_is_dropped() {
        let provider = PoolProvider::from_users(vec![User::new(1, "A", ""), User::new(2, "B", "")]);
        let mut app = loaded(2).await;

        let stale = app.open_selected().expect("story request");
        let session = app.session();
        app.close_viewer();

        let fresh = app.open_selected().expect("story request");
        let stale_response = stale.execute(&provider).await;
        app.apply_story(session, stale_response);
        assert!(app.viewer.as_ref().is_some_and(|v| v.story().is_none()));

        let response = fresh.execute(&provider).await;
        app.apply_story(app.session(), response);
        assert!(app.viewer.as_ref().is_some_and(|v| v.story().is_some()));
    }

    #[tokio::test]
    async fn test_finished_viewer_closes_with_status() {
        let provider = PoolProvider::from_users(vec![User::new(1, "A", "")]);
        let mut app = loaded(1).await;
        let request = app.open_selected();
        let viewer = app.viewer.as_mut().expect("viewer");
        viewer.complete(request, &provider).await;
        assert!(viewer.next_user().is_none());

        app.close_viewer_if_finished();
        assert_eq!(app.screen(), Screen::Carousel);
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_open_with_empty_list_does_nothing() {
        let mut app = app();
        assert!(app.open_selected().is_none());
        assert_eq!(app.screen(), Screen::Carousel);
    }

    #[tokio::test]
    async fn test_scroll_follows_selection() {
        let mut app = loaded(10).await;
        for _ in 0..4 {
            let _ = app.list.select_next();
        }
        app.scroll_to_selection(3);
        assert_eq!(app.carousel_offset, 2);

        app.list.select_previous();
        app.list.select_previous();
        app.list.select_previous();
        app.scroll_to_selection(3);
        assert_eq!(app.carousel_offset, 1);
    }
}
