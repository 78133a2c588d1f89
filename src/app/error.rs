use thiserror::Error;

use crate::domain::{ActionKind, ViewKind};

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Failed to synchronize {view}: {source}")]
    Sync {
        view: ViewKind,
        #[source]
        source: Box<ShelfError>,
    },

    #[error("Failed to {action} item {item_id}: {source}")]
    Action {
        action: ActionKind,
        item_id: String,
        #[source]
        source: Box<ShelfError>,
    },

    #[error("An action is already pending for item {0}")]
    ActionPending(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Not logged in: consumer key and access token are required")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShelfError {
    /// True for failures of the round trip itself, which leave local state untouched.
    pub fn is_transport(&self) -> bool {
        match self {
            ShelfError::Http(_) | ShelfError::Remote(_) | ShelfError::NotAuthenticated => true,
            ShelfError::Sync { source, .. } | ShelfError::Action { source, .. } => {
                source.is_transport()
            }
            _ => false,
        }
    }

    pub(crate) fn sync(view: ViewKind, source: ShelfError) -> Self {
        ShelfError::Sync {
            view,
            source: Box::new(source),
        }
    }

    pub(crate) fn action(action: ActionKind, item_id: &str, source: ShelfError) -> Self {
        ShelfError::Action {
            action,
            item_id: item_id.to_string(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;
