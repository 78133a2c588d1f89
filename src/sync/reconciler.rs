//! Confirm-then-apply execution of item actions.
//!
//! Nothing local changes until the remote service accepts an action. A
//! failed or rejected round trip leaves both the cache and the caller's
//! window exactly as they were.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::app::{Result, ShelfError};
use crate::domain::{join_tags, ActionKind, Item, ItemAction, PendingAction, ViewKind};
use crate::normalizer::Normalizer;
use crate::remote::{AddRequest, RemoteClient};

use super::cache::{Removal, ViewCache};

/// Local effect of an accepted action.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmed {
    /// The item left `view`. `removal` is `None` when it was not cached there.
    Removed {
        view: ViewKind,
        item_id: String,
        removal: Option<Removal>,
    },
    /// The item was changed in place. `None` when it was not cached.
    Updated {
        view: ViewKind,
        item: Option<Item>,
        /// Direction the favorite toggle takes next time.
        next: Option<ItemAction>,
    },
    /// The service accepted the action but the item stays where it is.
    Unchanged { view: ViewKind, item_id: String },
}

/// An accepted create: the item as stored and the List count if cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub item: Item,
    pub count: Option<usize>,
}

pub struct ActionReconciler {
    cache: Arc<ViewCache>,
    remote: Arc<dyn RemoteClient + Send + Sync>,
    normalizer: Normalizer,
    in_flight: Mutex<HashSet<String>>,
}

impl ActionReconciler {
    pub fn new(cache: Arc<ViewCache>, remote: Arc<dyn RemoteClient + Send + Sync>) -> Self {
        Self {
            cache,
            remote,
            normalizer: Normalizer::new(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Submit `action` for `item_id` as seen from `view` and apply it locally
    /// once the service accepts it.
    pub async fn apply(
        &self,
        view: ViewKind,
        item_id: &str,
        action: ItemAction,
    ) -> Result<Confirmed> {
        let _guard = InFlight::claim(&self.in_flight, item_id)?;

        let pending = PendingAction::new(action, item_id);
        let kind = pending.action.kind();
        tracing::debug!("Submitting {} for item {} in {}", kind, item_id, view);

        let response = self
            .remote
            .submit(&[pending.to_request()])
            .await
            .map_err(|e| ShelfError::action(kind, item_id, e))?;
        response
            .ensure_accepted()
            .map_err(|e| ShelfError::action(kind, item_id, e))?;

        let confirmed = match pending.action {
            ItemAction::Archive if view == ViewKind::Archive => Confirmed::Unchanged {
                view,
                item_id: item_id.to_string(),
            },
            ItemAction::Unarchive if view == ViewKind::List => Confirmed::Unchanged {
                view,
                item_id: item_id.to_string(),
            },
            ItemAction::Archive | ItemAction::Unarchive | ItemAction::Delete => {
                Confirmed::Removed {
                    view,
                    item_id: item_id.to_string(),
                    removal: self.cache.remove_by_id(view, item_id)?,
                }
            }
            ItemAction::Favorite | ItemAction::Unfavorite => {
                let favorited = pending.action == ItemAction::Favorite;
                Confirmed::Updated {
                    view,
                    item: self.cache.update_favorite(view, item_id, favorited)?,
                    next: Some(ItemAction::favorite_toggle(favorited)),
                }
            }
            ItemAction::Tag(ref tags) => Confirmed::Updated {
                view,
                item: self.cache.update_tags(view, item_id, tags)?,
                next: None,
            },
        };

        tracing::info!("Confirmed {} for item {}", kind, item_id);
        Ok(confirmed)
    }

    /// Save a new url and put it at the front of the List snapshot.
    pub async fn create(&self, url: &str, tags: &BTreeSet<String>) -> Result<Created> {
        let request = AddRequest {
            url: url.to_string(),
            title: None,
            tags: (!tags.is_empty()).then(|| join_tags(tags)),
            time: Utc::now().timestamp(),
        };

        let response = self
            .remote
            .add(&request)
            .await
            .map_err(|e| ShelfError::action(ActionKind::Create, url, e))?;
        let payload = response.item.ok_or_else(|| {
            ShelfError::MalformedPayload("add response carries no item".to_string())
        })?;

        let mut item = self.normalizer.normalize_item(payload, 0)?;
        if item.tags.is_empty() {
            item.tags = tags.clone();
        }
        let count = self.cache.insert_front(ViewKind::List, &mut item)?;

        tracing::info!("Created item {} ({})", item.id, item.url);
        Ok(Created { item, count })
    }

    #[cfg(test)]
    fn is_in_flight(&self, item_id: &str) -> bool {
        self.in_flight
            .lock()
            .map(|set| set.contains(item_id))
            .unwrap_or(false)
    }
}

/// Marks an item busy for the lifetime of one round trip.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    item_id: String,
}

impl<'a> InFlight<'a> {
    fn claim(set: &'a Mutex<HashSet<String>>, item_id: &str) -> Result<Self> {
        let mut guard = set
            .lock()
            .map_err(|_| ShelfError::ActionPending(item_id.to_string()))?;
        if !guard.insert(item_id.to_string()) {
            return Err(ShelfError::ActionPending(item_id.to_string()));
        }

        Ok(Self {
            set,
            item_id: item_id.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.item_id);
        }
    }
}
