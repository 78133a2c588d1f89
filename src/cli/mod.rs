pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ViewKind;

#[derive(Parser)]
#[command(name = "linkshelf")]
#[command(about = "A terminal client for your saved links", long_about = None)]
pub struct Cli {
    /// Database file (default: <data dir>/linkshelf/linkshelf.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// View to work on: "list" or "archive" (default from config)
    #[arg(long, global = true)]
    pub view: Option<ViewKind>,

    /// Log file path (default: stderr, or nowhere for the TUI)
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the current items of a view
    Sync,
    /// Show cached items, one page at a time
    List {
        /// Page to show, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Archive an item from My List, or move it back from the Archive
    Read {
        id: String,
    },
    /// Mark an item as favorite
    Favorite {
        id: String,
    },
    /// Remove an item from favorites
    Unfavorite {
        id: String,
    },
    /// Delete an item for good
    Delete {
        id: String,
    },
    /// Replace the tags of an item
    Tag {
        id: String,
        /// Comma separated, e.g. "rust, later"
        tags: String,
    },
    /// Save a new url to My List
    Add {
        url: String,
        /// Comma separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
    },
    /// Forget all locally cached data
    Logout,
    /// Launch the TUI
    Tui,
}
