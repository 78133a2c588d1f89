use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two independently cached collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Unread items.
    #[default]
    List,
    /// Archived items.
    Archive,
}

impl ViewKind {
    /// Store key holding the JSON snapshot for this view.
    pub fn snapshot_key(self) -> &'static str {
        match self {
            ViewKind::List => "listFromLocalStorage",
            ViewKind::Archive => "archiveListFromLocalStorage",
        }
    }

    /// Store key holding the decimal item count for this view.
    pub fn count_key(self) -> &'static str {
        match self {
            ViewKind::List => "listCount",
            ViewKind::Archive => "archiveCount",
        }
    }

    pub fn state_filter(self) -> StateFilter {
        match self {
            ViewKind::List => StateFilter::Unread,
            ViewKind::Archive => StateFilter::Archive,
        }
    }

    pub fn other(self) -> Self {
        match self {
            ViewKind::List => ViewKind::Archive,
            ViewKind::Archive => ViewKind::List,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::List => "My List",
            ViewKind::Archive => "Archive",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            ViewKind::List => 0,
            ViewKind::Archive => 1,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::List => f.write_str("list"),
            ViewKind::Archive => f.write_str("archive"),
        }
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "list" | "unread" => Ok(ViewKind::List),
            "archive" | "archived" => Ok(ViewKind::Archive),
            _ => Err(format!("Unknown view: {}. Use 'list' or 'archive'", s)),
        }
    }
}

/// `state` filter understood by the remote retrieve endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    Unread,
    Archive,
}

/// Render order over the ascending snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}
