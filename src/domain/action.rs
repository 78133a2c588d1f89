use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ViewKind;

/// A user-triggered mutation of a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    Favorite,
    Unfavorite,
    Archive,
    Unarchive,
    Delete,
    /// Replace the item's tag set.
    Tag(BTreeSet<String>),
}

impl ItemAction {
    /// The unified read toggle: archive from the list, re-add from the archive.
    pub fn read_toggle(view: ViewKind) -> Self {
        match view {
            ViewKind::List => ItemAction::Archive,
            ViewKind::Archive => ItemAction::Unarchive,
        }
    }

    pub fn favorite_toggle(currently_favorited: bool) -> Self {
        if currently_favorited {
            ItemAction::Unfavorite
        } else {
            ItemAction::Favorite
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ItemAction::Favorite => ActionKind::Favorite,
            ItemAction::Unfavorite => ActionKind::Unfavorite,
            ItemAction::Archive => ActionKind::Archive,
            ItemAction::Unarchive => ActionKind::Unarchive,
            ItemAction::Delete => ActionKind::Delete,
            ItemAction::Tag(_) => ActionKind::Tag,
        }
    }
}

/// Payload-free discriminant of an action, used for messaging and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Favorite,
    Unfavorite,
    Archive,
    Unarchive,
    Delete,
    Tag,
    Create,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Favorite => "favorite",
            ActionKind::Unfavorite => "unfavorite",
            ActionKind::Archive => "archive",
            ActionKind::Unarchive => "unarchive",
            ActionKind::Delete => "delete",
            ActionKind::Tag => "tag",
            ActionKind::Create => "create",
        };
        f.write_str(s)
    }
}

/// An action waiting on its remote round trip.
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub action: ItemAction,
    pub item_id: String,
    pub issued_at: DateTime<Utc>,
}

impl PendingAction {
    pub fn new(action: ItemAction, item_id: impl Into<String>) -> Self {
        Self {
            action,
            item_id: item_id.into(),
            issued_at: Utc::now(),
        }
    }

    pub fn to_request(&self) -> ActionRequest {
        let (action, tags) = match &self.action {
            ItemAction::Favorite => ("favorite", None),
            ItemAction::Unfavorite => ("unfavorite", None),
            ItemAction::Archive => ("archive", None),
            ItemAction::Unarchive => ("readd", None),
            ItemAction::Delete => ("delete", None),
            ItemAction::Tag(tags) => ("tags_replace", Some(join_tags(tags))),
        };

        ActionRequest {
            action,
            item_id: self.item_id.clone(),
            time: self.issued_at.timestamp(),
            tags,
        }
    }
}

/// One entry of an action batch as sent to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRequest {
    pub action: &'static str,
    pub item_id: String,
    pub time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

/// Split a comma separated tag string, trimming whitespace and dropping empties.
pub fn parse_tags(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

pub fn join_tags(tags: &BTreeSet<String>) -> String {
    tags.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}
