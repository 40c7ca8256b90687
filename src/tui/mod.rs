pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::{AppContext, Result};
use crate::config::Config;
use crate::content::ContentProvider;
use crate::controller::{ListRequest, ListResponse, StoryRequest, StoryResponse};

use self::app::{Screen, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Poll rate of the event loop; shorter than the playback tick so progress
/// bars redraw smoothly.
const POLL_RATE: Duration = Duration::from_millis(25);

pub async fn run(ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, config).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Results of fetches running in spawned tasks.
enum Fetched {
    Users(ListResponse),
    Story { session: u64, response: StoryResponse },
}

/// Runs controller requests off the UI loop and posts the results back.
struct Dispatcher {
    provider: Arc<dyn ContentProvider>,
    results: mpsc::UnboundedSender<Fetched>,
}

impl Dispatcher {
    fn users(&self, request: Option<ListRequest>) {
        let Some(request) = request else {
            return;
        };
        let provider = self.provider.clone();
        let results = self.results.clone();
        tokio::spawn(async move {
            let response = request.execute(provider.as_ref()).await;
            let _ = results.send(Fetched::Users(response));
        });
    }

    fn story(&self, session: u64, request: Option<StoryRequest>) {
        let Some(request) = request else {
            return;
        };
        let provider = self.provider.clone();
        let results = self.results.clone();
        tokio::spawn(async move {
            let response = request.execute(provider.as_ref()).await;
            let _ = results.send(Fetched::Story { session, response });
        });
    }
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut tui_app = TuiApp::new(ctx.interactions.clone());
    let event_handler = EventHandler::new(POLL_RATE);
    let (results_tx, mut results_rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher {
        provider: ctx.provider.clone(),
        results: results_tx,
    };

    dispatcher.users(tui_app.list.load_initial());

    loop {
        terminal.draw(|frame| {
            tui_app.scroll_to_selection(layout::avatar_slots(frame.area()));
            layout::render(frame, &tui_app, &config.colors);
        })?;

        if let AppEvent::Key(key) = event_handler.next()? {
            let action = config.keybindings.get_action(&key);
            match tui_app.screen() {
                Screen::Carousel => handle_carousel_action(&mut tui_app, &dispatcher, action),
                Screen::Viewer => handle_viewer_action(&mut tui_app, &dispatcher, action),
            }
        }

        let session = tui_app.session();
        for request in tui_app.drain_ticks() {
            dispatcher.story(session, Some(request));
        }

        while let Ok(fetched) = results_rx.try_recv() {
            match fetched {
                Fetched::Users(response) => tui_app.list.apply(response),
                Fetched::Story { session, response } => tui_app.apply_story(session, response),
            }
        }

        tui_app.close_viewer_if_finished();
        tui_app.advance_frame();

        if tui_app.should_quit {
            break;
        }
    }

    info!("Exiting");
    Ok(())
}

fn handle_carousel_action(tui_app: &mut TuiApp, dispatcher: &Dispatcher, action: Action) {
    match action {
        Action::Quit => {
            tui_app.should_quit = true;
        }
        Action::Left | Action::Up => {
            tui_app.list.select_previous();
        }
        Action::Right | Action::Down => {
            dispatcher.users(tui_app.list.select_next());
        }
        Action::Select => {
            let request = tui_app.open_selected();
            dispatcher.story(tui_app.session(), request);
        }
        Action::Reload => {
            tui_app.clear_status();
            dispatcher.users(tui_app.list.load_initial());
        }
        _ => {}
    }
}

fn handle_viewer_action(tui_app: &mut TuiApp, dispatcher: &Dispatcher, action: Action) {
    let session = tui_app.session();
    let Some(viewer) = tui_app.viewer.as_mut() else {
        return;
    };

    match action {
        Action::Quit => {
            tui_app.should_quit = true;
        }
        Action::Back => {
            tui_app.close_viewer();
        }
        Action::Left => dispatcher.story(session, viewer.previous_item()),
        Action::Right => dispatcher.story(session, viewer.next_item()),
        Action::Up => dispatcher.story(session, viewer.previous_user()),
        Action::Down => dispatcher.story(session, viewer.next_user()),
        Action::TogglePause => {
            if viewer.is_paused() {
                viewer.resume();
            } else {
                viewer.pause();
            }
        }
        Action::ToggleLike => {
            viewer.toggle_like_for_current_item();
        }
        Action::OpenImage => {
            if let Some(item) = viewer.current_item() {
                if let Err(e) = open::that(&item.image_url) {
                    warn!(item_id = %item.id, "Failed to open image: {}", e);
                    tui_app.set_status(format!("Failed to open image: {}", e));
                }
            }
        }
        Action::Reload => {
            let index = viewer.cursor().user_index;
            dispatcher.story(session, viewer.load_story(index));
        }
        Action::Select | Action::None => {}
    }
}
