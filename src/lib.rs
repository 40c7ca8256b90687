//! # Storyreel
//!
//! A terminal stories carousel: a paginated strip of user avatars, each
//! opening a short auto-advancing story, with seen and liked state kept
//! across runs.
//!
//! ## Architecture
//!
//! ```text
//! ContentProvider → StoryListController ─┐
//!                 → StoryPlaybackController ─→ TUI
//! Store → InteractionStore ──────────────┘
//! ```
//!
//! Controllers never await. Operations that need content return a request;
//! the caller executes it against a [`ContentProvider`](content::ContentProvider)
//! and hands the response back, so stale responses can be recognised and
//! dropped.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the carousel
//! storyreel
//!
//! # Print the second page of users
//! storyreel users --page 2
//!
//! # Toggle a like from the command line
//! storyreel like 3-1
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TUI colors, keybindings and content paths
//! - [`content`]: User pages and story synthesis
//! - [`controller`]: List pagination and story playback state machines
//! - [`domain`]: Users, stories and interaction state
//! - [`interaction`]: Observable seen/liked sets
//! - [`store`]: Persistence backends
//! - [`tui`]: Terminal user interface

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// interaction state and content provider.
pub mod app;

/// Command-line interface using clap.
///
/// - `tui` - Launch the carousel (the default)
/// - `users [--page N]` - Print users
/// - `story <user_id>` - Print a story
/// - `like <item_id>` - Toggle a like
/// - `seen` / `liked` - Print persisted state
pub mod cli;

/// Configuration management for the TUI.
///
/// Loads from `~/.config/storyreel/config.toml`, supporting:
/// - Custom colors (named or hex)
/// - Custom keybindings
/// - Users file and database overrides
pub mod config;

/// User pages and story content.
///
/// - [`ContentProvider`](content::ContentProvider): Async trait for content
/// - [`PoolProvider`](content::PoolProvider): Cyclic pages over a loaded pool
/// - [`MockProvider`](content::MockProvider): Fixed data for previews
pub mod content;

/// Presentation state machines.
pub mod controller;

/// Core domain models.
///
/// - [`User`](domain::User): A story owner
/// - [`Story`](domain::Story): Deterministic items for a user
/// - [`InteractionState`](domain::InteractionState): Seen users and liked items
pub mod domain;

/// Seen and liked sets with replay-latest change streams.
pub mod interaction;

/// Persistence layer.
///
/// - [`Store`](store::Store): Trait for loading and saving interaction sets
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
/// - [`MemoryStore`](store::MemoryStore): Non-persistent implementation
pub mod store;

/// Terminal user interface.
///
/// An avatar carousel with a detail pane, and a full-screen viewer with
/// segmented progress bars.
pub mod tui;
