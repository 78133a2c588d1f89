//! Per-view persisted snapshots and their companion counts.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::app::{Result, ShelfError};
use crate::domain::{Item, ViewKind};
use crate::normalizer::Normalizer;
use crate::remote::RemoteClient;
use crate::store::Store;

/// Result of a refresh that reached the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The snapshot was replaced; carries the new count.
    Applied(usize),
    /// A newer refresh of the same view started meanwhile; nothing was written.
    Superseded,
}

/// Where an item was removed from and what the count became.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub index: usize,
    pub count: usize,
}

pub struct ViewCache {
    store: Arc<dyn Store + Send + Sync>,
    remote: Arc<dyn RemoteClient + Send + Sync>,
    normalizer: Normalizer,
    generations: [AtomicU64; 2],
    /// Serializes every load-modify-write of a snapshot.
    writes: Mutex<()>,
}

impl ViewCache {
    pub fn new(
        store: Arc<dyn Store + Send + Sync>,
        remote: Arc<dyn RemoteClient + Send + Sync>,
    ) -> Self {
        Self {
            store,
            remote,
            normalizer: Normalizer::new(),
            generations: [AtomicU64::new(0), AtomicU64::new(0)],
            writes: Mutex::new(()),
        }
    }

    /// Replace the snapshot of `view` with the remote's current item set.
    ///
    /// Only the most recently started refresh of a view may write; earlier
    /// ones that complete later report `Superseded`. On failure the previous
    /// snapshot is left as it was.
    pub async fn refresh(&self, view: ViewKind) -> Result<RefreshOutcome> {
        let generation = self.generations[view.index()].fetch_add(1, Ordering::SeqCst) + 1;

        let response = self.remote.fetch(view.state_filter()).await;

        let _writes = self.lock_writes();
        if !self.is_current(view, generation) {
            tracing::warn!(
                "Discarding refresh #{} of {}: a newer refresh is in flight",
                generation,
                view
            );
            return Ok(RefreshOutcome::Superseded);
        }

        let response = response.map_err(|e| {
            if e.is_transport() {
                ShelfError::sync(view, e)
            } else {
                e
            }
        })?;
        let items = self.normalizer.normalize_list(response)?;

        self.write(view, &items)?;
        tracing::info!("Synchronized {}: {} items", view, items.len());

        Ok(RefreshOutcome::Applied(items.len()))
    }

    /// Read the persisted snapshot. `None` means never synchronized.
    pub fn load(&self, view: ViewKind) -> Result<Option<Vec<Item>>> {
        let Some(raw) = self.store.get(view.snapshot_key())? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Ok(Some(items)),
            Err(e) => {
                tracing::warn!("Unreadable {} snapshot, treating as absent: {}", view, e);
                Ok(None)
            }
        }
    }

    /// Read the persisted count, as rendered before the snapshot is parsed.
    pub fn count(&self, view: ViewKind) -> Result<Option<usize>> {
        Ok(self
            .store
            .get(view.count_key())?
            .and_then(|raw| raw.trim().parse().ok()))
    }

    /// Remove the first item with `item_id`. `None` if it was not cached.
    pub fn remove_by_id(&self, view: ViewKind, item_id: &str) -> Result<Option<Removal>> {
        let _writes = self.lock_writes();
        let Some(mut items) = self.load(view)? else {
            return Ok(None);
        };
        let Some(index) = items.iter().position(|item| item.id == item_id) else {
            return Ok(None);
        };

        items.remove(index);
        self.write(view, &items)?;

        Ok(Some(Removal {
            index,
            count: items.len(),
        }))
    }

    /// Set the favorite flag in place. Returns the updated item if found.
    pub fn update_favorite(
        &self,
        view: ViewKind,
        item_id: &str,
        favorited: bool,
    ) -> Result<Option<Item>> {
        self.update(view, item_id, |item| item.favorited = favorited)
    }

    /// Replace the tag set in place. Returns the updated item if found.
    pub fn update_tags(
        &self,
        view: ViewKind,
        item_id: &str,
        tags: &BTreeSet<String>,
    ) -> Result<Option<Item>> {
        self.update(view, item_id, |item| item.tags = tags.clone())
    }

    /// Put `item` ahead of everything in the snapshot.
    ///
    /// The item's sort key is rewritten to sit below the current minimum.
    /// Returns the new count, or `None` when the view was never synchronized
    /// (the next refresh will bring the item in).
    pub fn insert_front(&self, view: ViewKind, item: &mut Item) -> Result<Option<usize>> {
        let _writes = self.lock_writes();
        let Some(mut items) = self.load(view)? else {
            return Ok(None);
        };

        items.retain(|existing| existing.id != item.id);
        item.sort_key = items
            .first()
            .map(|first| first.sort_key.saturating_sub(1))
            .unwrap_or(0);
        items.insert(0, item.clone());
        self.write(view, &items)?;

        Ok(Some(items.len()))
    }

    /// Forget every snapshot and count.
    pub fn clear(&self) -> Result<()> {
        let _writes = self.lock_writes();
        self.store.clear()
    }

    fn update<F>(&self, view: ViewKind, item_id: &str, apply: F) -> Result<Option<Item>>
    where
        F: FnOnce(&mut Item),
    {
        let _writes = self.lock_writes();
        let Some(mut items) = self.load(view)? else {
            return Ok(None);
        };
        let Some(item) = items.iter_mut().find(|item| item.id == item_id) else {
            return Ok(None);
        };

        apply(item);
        let updated = item.clone();
        self.write(view, &items)?;

        Ok(Some(updated))
    }

    /// Snapshot first, then count, in one store transaction.
    fn write(&self, view: ViewKind, items: &[Item]) -> Result<()> {
        let snapshot = serde_json::to_string(items)?;
        let count = items.len().to_string();

        self.store.set_many(&[
            (view.snapshot_key(), snapshot.as_str()),
            (view.count_key(), count.as_str()),
        ])?;
        tracing::debug!("Wrote {} snapshot ({} items)", view, items.len());

        Ok(())
    }

    /// The guarded value is `()`, so a poisoned lock is still usable.
    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, view: ViewKind, generation: u64) -> bool {
        self.generations[view.index()].load(Ordering::SeqCst) == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StateFilter;
    use crate::store::SqliteStore;
    use crate::sync::testing::{payload, FakeRemote};

    fn cache_with(remote: Arc<FakeRemote>) -> (ViewCache, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        (ViewCache::new(store.clone(), remote), store)
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_refresh_sorts_and_counts() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(StateFilter::Unread, vec![payload("1", 2), payload("2", 1)]);
        let (cache, _) = cache_with(remote);

        let outcome = cache.refresh(ViewKind::List).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Applied(2));

        let items = cache.load(ViewKind::List).unwrap().unwrap();
        assert_eq!(ids(&items), vec!["2", "1"]);
        assert_eq!(cache.count(ViewKind::List).unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_refresh_overwrites_instead_of_merging() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(StateFilter::Unread, vec![payload("1", 0), payload("2", 1)]);
        let (cache, _) = cache_with(remote.clone());
        cache.refresh(ViewKind::List).await.unwrap();

        remote.set_items(StateFilter::Unread, vec![payload("3", 0)]);
        cache.refresh(ViewKind::List).await.unwrap();

        let items = cache.load(ViewKind::List).unwrap().unwrap();
        assert_eq!(ids(&items), vec!["3"]);
        assert_eq!(cache.count(ViewKind::List).unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_refresh_views_are_independent() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(StateFilter::Unread, vec![payload("1", 0)]);
        remote.set_items(StateFilter::Archive, vec![payload("2", 0), payload("3", 1)]);
        let (cache, _) = cache_with(remote);

        cache.refresh(ViewKind::Archive).await.unwrap();

        assert!(cache.load(ViewKind::List).unwrap().is_none());
        assert_eq!(cache.count(ViewKind::Archive).unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_snapshot() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(StateFilter::Unread, vec![payload("1", 0)]);
        let (cache, _) = cache_with(remote.clone());
        cache.refresh(ViewKind::List).await.unwrap();
        let before = cache.load(ViewKind::List).unwrap();

        remote.fail_fetches(true);
        let err = cache.refresh(ViewKind::List).await.unwrap_err();
        assert!(matches!(err, ShelfError::Sync { view: ViewKind::List, .. }));

        assert_eq!(cache.load(ViewKind::List).unwrap(), before);
        assert_eq!(cache.count(ViewKind::List).unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_refresh_failure_on_absent_stays_absent() {
        let remote = Arc::new(FakeRemote::new());
        remote.fail_fetches(true);
        let (cache, _) = cache_with(remote);

        assert!(cache.refresh(ViewKind::Archive).await.is_err());
        assert!(cache.load(ViewKind::Archive).unwrap().is_none());
        assert!(cache.count(ViewKind::Archive).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_response_writes_nothing() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(StateFilter::Unread, vec![payload("1", 0)]);
        let (cache, _) = cache_with(remote.clone());
        cache.refresh(ViewKind::List).await.unwrap();

        let mut broken = payload("2", 0);
        broken.sort_id = Some("first".into());
        remote.set_items(StateFilter::Unread, vec![payload("3", 1), broken]);

        let err = cache.refresh(ViewKind::List).await.unwrap_err();
        assert!(matches!(err, ShelfError::MalformedPayload(_)));

        let items = cache.load(ViewKind::List).unwrap().unwrap();
        assert_eq!(ids(&items), vec!["1"]);
    }

    #[tokio::test]
    async fn test_empty_is_not_absent() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(StateFilter::Unread, vec![]);
        let (cache, _) = cache_with(remote);

        assert!(cache.load(ViewKind::List).unwrap().is_none());

        assert_eq!(
            cache.refresh(ViewKind::List).await.unwrap(),
            RefreshOutcome::Applied(0)
        );
        assert_eq!(cache.load(ViewKind::List).unwrap(), Some(vec![]));
        assert_eq!(cache.count(ViewKind::List).unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_stale_refresh_is_discarded() {
        let remote = Arc::new(FakeRemote::new());
        let (cache, _) = cache_with(remote.clone());

        let slow_gate = remote.gate_next_fetch();
        remote.set_items(StateFilter::Unread, vec![payload("old", 0)]);

        let slow = cache.refresh(ViewKind::List);
        let fast = async {
            // The slow refresh is parked on its gate; start a newer one
            tokio::task::yield_now().await;
            remote.set_items(StateFilter::Unread, vec![payload("new", 0)]);
            let outcome = cache.refresh(ViewKind::List).await;
            slow_gate.send(()).ok();
            outcome
        };

        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(fast.unwrap(), RefreshOutcome::Applied(1));
        assert_eq!(slow.unwrap(), RefreshOutcome::Superseded);

        let items = cache.load(ViewKind::List).unwrap().unwrap();
        assert_eq!(ids(&items), vec!["new"]);
    }

    #[tokio::test]
    async fn test_remove_by_id() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(
            StateFilter::Unread,
            vec![payload("a", 0), payload("b", 1), payload("c", 2)],
        );
        let (cache, _) = cache_with(remote);
        cache.refresh(ViewKind::List).await.unwrap();

        let removal = cache.remove_by_id(ViewKind::List, "b").unwrap();
        assert_eq!(removal, Some(Removal { index: 1, count: 2 }));

        let items = cache.load(ViewKind::List).unwrap().unwrap();
        assert_eq!(ids(&items), vec!["a", "c"]);
        assert_eq!(cache.count(ViewKind::List).unwrap(), Some(2));

        assert_eq!(cache.remove_by_id(ViewKind::List, "b").unwrap(), None);
        assert_eq!(cache.count(ViewKind::List).unwrap(), Some(2));
    }

    #[test]
    fn test_remove_from_absent_view() {
        let (cache, _) = cache_with(Arc::new(FakeRemote::new()));
        assert_eq!(cache.remove_by_id(ViewKind::Archive, "x").unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_favorite_and_tags() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(StateFilter::Unread, vec![payload("a", 0)]);
        let (cache, _) = cache_with(remote);
        cache.refresh(ViewKind::List).await.unwrap();

        let item = cache.update_favorite(ViewKind::List, "a", true).unwrap().unwrap();
        assert!(item.favorited);

        let tags: BTreeSet<String> = ["x".to_string(), "y".to_string()].into();
        let item = cache.update_tags(ViewKind::List, "a", &tags).unwrap().unwrap();
        assert_eq!(item.tags, tags);

        let stored = cache.load(ViewKind::List).unwrap().unwrap();
        assert!(stored[0].favorited);
        assert_eq!(stored[0].tags, tags);
        assert_eq!(cache.count(ViewKind::List).unwrap(), Some(1));

        assert!(cache
            .update_favorite(ViewKind::List, "missing", true)
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_insert_front() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(StateFilter::Unread, vec![payload("a", 4), payload("b", 5)]);
        let (cache, _) = cache_with(remote);

        let mut item = Item::new("n", 99, "https://example.com/n");
        assert_eq!(cache.insert_front(ViewKind::List, &mut item).unwrap(), None);
        assert!(cache.load(ViewKind::List).unwrap().is_none());

        cache.refresh(ViewKind::List).await.unwrap();
        assert_eq!(cache.insert_front(ViewKind::List, &mut item).unwrap(), Some(3));
        assert_eq!(item.sort_key, 3);

        let items = cache.load(ViewKind::List).unwrap().unwrap();
        assert_eq!(ids(&items), vec!["n", "a", "b"]);
        assert_eq!(items[0].sort_key, 3);
        assert_eq!(cache.count(ViewKind::List).unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_concurrent_removals_are_all_kept() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(
            StateFilter::Unread,
            (0..64).map(|i| payload(&i.to_string(), i)).collect(),
        );
        let (cache, _) = cache_with(remote);
        cache.refresh(ViewKind::List).await.unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..64)
                .map(|i| {
                    let cache = &cache;
                    scope.spawn(move || cache.remove_by_id(ViewKind::List, &i.to_string()))
                })
                .collect();

            for handle in handles {
                assert!(handle.join().unwrap().unwrap().is_some());
            }
        });

        assert_eq!(cache.load(ViewKind::List).unwrap(), Some(vec![]));
        assert_eq!(cache.count(ViewKind::List).unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_insert_front_at_minimum_sort_key() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(StateFilter::Unread, vec![payload("a", i64::MIN)]);
        let (cache, _) = cache_with(remote);
        cache.refresh(ViewKind::List).await.unwrap();

        let mut item = Item::new("n", 0, "https://example.com/n");
        assert_eq!(cache.insert_front(ViewKind::List, &mut item).unwrap(), Some(2));
        assert_eq!(item.sort_key, i64::MIN);
    }

    #[test]
    fn test_unreadable_snapshot_is_absent() {
        let (cache, store) = cache_with(Arc::new(FakeRemote::new()));
        store.set(ViewKind::List.snapshot_key(), "{not json").unwrap();
        assert!(cache.load(ViewKind::List).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(StateFilter::Unread, vec![payload("a", 0)]);
        let (cache, _) = cache_with(remote);
        cache.refresh(ViewKind::List).await.unwrap();

        cache.clear().unwrap();
        assert!(cache.load(ViewKind::List).unwrap().is_none());
        assert!(cache.count(ViewKind::List).unwrap().is_none());
    }
}
