//! Configuration management for the storyreel TUI.
//!
//! Configuration is read from `~/.config/storyreel/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
    pub content: ContentConfig,
}

/// Where users and interaction state come from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// A `{ "pages": [...] }` users document. The bundled one is used when unset.
    pub users_path: Option<PathBuf>,
    /// SQLite database for seen/liked state.
    pub database_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// A missing file is created with commented defaults. Missing fields
    /// fall back to their defaults; an unparsable file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// `~/.config/storyreel/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("storyreel").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, Self::default_config_content()).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn default_config_content() -> &'static str {
        r##"# storyreel configuration
#
# Colors: named (Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
# DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
# LightCyan, White, Reset) or hex ("#RRGGBB", "#RGB").
#
# Keys: single characters ("f"), special keys (Enter, Esc, Space, Left,
# Right, Up, Down, Backspace, Tab, PageUp, PageDown, F1-F12) and modifiers
# ("Ctrl+c", "Shift+Tab", "Alt+Enter").

[colors]
border = "DarkGray"
unseen_ring = "Magenta"
seen_ring = "DarkGray"
selection_bg = "Magenta"
selection_fg = "Black"
progress_filled = "White"
progress_empty = "DarkGray"
liked = "Red"
error = "LightRed"
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
quit = ["q", "Ctrl+c"]
# Close the viewer
back = ["Esc", "Backspace"]
# Carousel: move selection. Viewer: previous/next item.
left = ["h", "Left"]
right = ["l", "Right"]
# Viewer: previous/next user
up = ["k", "Up"]
down = ["j", "Down"]
# Carousel: open the selected story
select = ["Enter"]
toggle_pause = ["Space", "p"]
toggle_like = ["f"]
# Open the current image with the system viewer
open_image = ["o"]
# Carousel: reload from the first page
reload = ["R"]

[content]
# users_path = "/path/to/users.json"
# database_path = "/path/to/storyreel.db"
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
