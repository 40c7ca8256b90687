pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "storyreel")]
#[command(about = "A terminal stories carousel", long_about = None)]
pub struct Cli {
    /// Path to the interaction database
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to a JSON file of user pages to use instead of the bundled data
    #[arg(long, global = true)]
    pub users: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the TUI (default)
    Tui,
    /// Print the initial users, or one page of users
    Users {
        /// Page to print (1-based)
        #[arg(short, long)]
        page: Option<u32>,
    },
    /// Print a user's story
    Story {
        /// ID of the user
        user_id: i64,
    },
    /// Toggle the like on a story item
    Like {
        /// ID of the story item, e.g. "3-1"
        item_id: String,
    },
    /// List users whose stories have been seen
    Seen,
    /// List liked story items
    Liked,
}
