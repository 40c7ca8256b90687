use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::app::Result;

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    poll_rate: Duration,
}

impl EventHandler {
    pub fn new(poll_rate: Duration) -> Self {
        Self { poll_rate }
    }

    /// Wait up to the poll rate for a key press.
    pub fn next(&self) -> Result<AppEvent> {
        if event::poll(self.poll_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(AppEvent::Key(key));
                }
            }
        }
        Ok(AppEvent::Tick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Back,
    Left,
    Right,
    Up,
    Down,
    Select,
    TogglePause,
    ToggleLike,
    OpenImage,
    Reload,
    None,
}
