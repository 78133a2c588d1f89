use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, ShelfError};
use crate::config::ApiConfig;
use crate::remote::{HttpRemote, RemoteClient};
use crate::store::{SqliteStore, Store};
use crate::sync::{ActionReconciler, ViewCache, ViewController, ViewSettings};

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub remote: Arc<dyn RemoteClient + Send + Sync>,
    pub cache: Arc<ViewCache>,
    pub reconciler: Arc<ActionReconciler>,
}

impl AppContext {
    pub fn new(api: &ApiConfig, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let remote: Arc<dyn RemoteClient + Send + Sync> = Arc::new(HttpRemote::new(api));
        Ok(Self::with_parts(store, remote))
    }

    pub fn in_memory(remote: Arc<dyn RemoteClient + Send + Sync>) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Ok(Self::with_parts(store, remote))
    }

    fn with_parts(store: Arc<SqliteStore>, remote: Arc<dyn RemoteClient + Send + Sync>) -> Self {
        let shared: Arc<dyn Store + Send + Sync> = store.clone();
        let cache = Arc::new(ViewCache::new(shared, remote.clone()));
        let reconciler = Arc::new(ActionReconciler::new(cache.clone(), remote.clone()));

        Self {
            store,
            remote,
            cache,
            reconciler,
        }
    }

    /// A controller over this context's cache, starting at the default view.
    pub fn controller(&self, settings: ViewSettings) -> ViewController {
        ViewController::new(self.cache.clone(), self.reconciler.clone(), settings)
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ShelfError::Config("Could not find data directory".into()))?;
        let shelf_dir = data_dir.join("linkshelf");
        std::fs::create_dir_all(&shelf_dir)?;
        Ok(shelf_dir.join("linkshelf.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StateFilter, ViewKind};
    use crate::sync::testing::{payload, FakeRemote};
    use crate::sync::MemorySurface;

    #[tokio::test]
    async fn test_context_wires_controller_to_store() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_items(StateFilter::Unread, vec![payload("1", 1), payload("2", 2)]);
        let ctx = AppContext::in_memory(remote).unwrap();

        let mut controller = ctx.controller(ViewSettings::default());
        let mut surface = MemorySurface::new();
        controller
            .switch_to(ViewKind::List, &mut surface)
            .await
            .unwrap();

        assert_eq!(ctx.store.get("listCount").unwrap().as_deref(), Some("2"));
        assert_eq!(surface.ids(), vec!["1", "2"]);
    }
}
