//! Active view bookkeeping and orchestration of cache, window and reconciler.

use std::sync::Arc;

use crate::app::{Result, ShelfError};
use crate::domain::{parse_tags, ActionKind, Item, ItemAction, SortOrder, ViewKind};

use super::cache::{RefreshOutcome, ViewCache};
use super::reconciler::{ActionReconciler, Confirmed, Created};
use super::surface::{Notice, RenderSurface};
use super::window::{PaginationWindow, Sentinel, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSettings {
    pub page_size: usize,
    pub order: SortOrder,
    pub archive_after_open: bool,
    pub default_view: ViewKind,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            order: SortOrder::Asc,
            archive_after_open: false,
            default_view: ViewKind::List,
        }
    }
}

/// What a render found in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendered {
    /// Never synchronized; a refresh is required.
    Absent,
    Items { shown: usize, count: usize },
}

pub struct ViewController {
    cache: Arc<ViewCache>,
    reconciler: Arc<ActionReconciler>,
    settings: ViewSettings,
    active: ViewKind,
    window: PaginationWindow,
    sentinel: Sentinel,
    // Active snapshot in render order
    ordered: Vec<Item>,
}

impl ViewController {
    pub fn new(
        cache: Arc<ViewCache>,
        reconciler: Arc<ActionReconciler>,
        settings: ViewSettings,
    ) -> Self {
        Self {
            cache,
            reconciler,
            active: settings.default_view,
            window: PaginationWindow::new(settings.page_size),
            sentinel: Sentinel::new(),
            ordered: Vec::new(),
            settings,
        }
    }

    pub fn active_view(&self) -> ViewKind {
        self.active
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn window(&self) -> &PaginationWindow {
        &self.window
    }

    /// Items currently materialized on the surface, in render order.
    pub fn materialized(&self) -> &[Item] {
        &self.ordered[..self.window.shown().min(self.ordered.len())]
    }

    pub fn find(&self, item_id: &str) -> Option<&Item> {
        self.ordered.iter().find(|item| item.id == item_id)
    }

    /// Make `view` active, show whatever is cached for it, then resync it.
    pub async fn switch_to(
        &mut self,
        view: ViewKind,
        surface: &mut dyn RenderSurface,
    ) -> Result<RefreshOutcome> {
        tracing::debug!("Switching to {}", view);
        self.active = view;
        self.render(surface)?;
        self.sync(surface).await
    }

    /// Refresh the active view and re-render it if the result still applies.
    pub async fn sync(&mut self, surface: &mut dyn RenderSurface) -> Result<RefreshOutcome> {
        let view = self.active;
        surface.notify(Notice::Synchronizing(view));
        let result = self.cache.refresh(view).await;
        self.on_refreshed(view, result, surface)
    }

    /// Apply the completion of a refresh of `view` to the surface.
    ///
    /// Completions for a view that is no longer active only touch the cache.
    pub fn on_refreshed(
        &mut self,
        view: ViewKind,
        result: Result<RefreshOutcome>,
        surface: &mut dyn RenderSurface,
    ) -> Result<RefreshOutcome> {
        match result {
            Ok(RefreshOutcome::Applied(count)) => {
                if view == self.active {
                    self.render(surface)?;
                    surface.notify(Notice::Synchronized(view));
                }
                Ok(RefreshOutcome::Applied(count))
            }
            Ok(RefreshOutcome::Superseded) => {
                if view == self.active {
                    surface.notify(Notice::SyncSuperseded(view));
                }
                Ok(RefreshOutcome::Superseded)
            }
            Err(e) => {
                tracing::error!("Refresh of {} failed: {}", view, e);
                if view == self.active {
                    surface.notify(Notice::SyncFailed(view));
                }
                Err(e)
            }
        }
    }

    /// Redraw the active view from its cached snapshot, starting over at the
    /// first slice.
    pub fn render(&mut self, surface: &mut dyn RenderSurface) -> Result<Rendered> {
        self.window.reset();
        self.sentinel.reset();
        surface.clear(self.active);
        surface.set_count(self.cache.count(self.active)?);

        let Some(mut items) = self.cache.load(self.active)? else {
            self.ordered.clear();
            surface.set_empty(false);
            return Ok(Rendered::Absent);
        };

        if self.settings.order == SortOrder::Desc {
            items.reverse();
        }
        self.ordered = items;

        let slice = self.window.first_slice(&self.ordered);
        surface.append(slice);
        surface.set_count(Some(self.ordered.len()));
        surface.set_empty(self.ordered.is_empty());

        Ok(Rendered::Items {
            shown: self.window.shown(),
            count: self.ordered.len(),
        })
    }

    /// Feed the end-of-list visibility signal. Returns how many items were
    /// appended.
    pub fn on_sentinel(&mut self, visible: bool, surface: &mut dyn RenderSurface) -> usize {
        if !self.sentinel.observe(visible) {
            return 0;
        }
        self.load_more(surface)
    }

    /// Append the next slice regardless of the visibility edge.
    pub fn load_more(&mut self, surface: &mut dyn RenderSurface) -> usize {
        if self.window.is_exhausted() {
            return 0;
        }

        let slice = self.window.next_slice(&self.ordered);
        if slice.is_empty() {
            surface.notify(Notice::EverythingLoaded);
            return 0;
        }

        surface.notify(Notice::Loading);
        surface.append(slice);
        slice.len()
    }

    /// Archive from the list, re-add from the archive.
    pub async fn toggle_read(
        &mut self,
        item_id: &str,
        surface: &mut dyn RenderSurface,
    ) -> Result<Confirmed> {
        let action = ItemAction::read_toggle(self.active);
        self.perform(item_id, action, surface).await
    }

    pub async fn toggle_favorite(
        &mut self,
        item_id: &str,
        surface: &mut dyn RenderSurface,
    ) -> Result<Confirmed> {
        let favorited = self
            .find(item_id)
            .map(|item| item.favorited)
            .ok_or_else(|| ShelfError::ItemNotFound(item_id.to_string()))?;
        self.perform(item_id, ItemAction::favorite_toggle(favorited), surface)
            .await
    }

    /// Replace the tags of an item from comma separated input.
    pub async fn set_tags(
        &mut self,
        item_id: &str,
        input: &str,
        surface: &mut dyn RenderSurface,
    ) -> Result<Confirmed> {
        self.perform(item_id, ItemAction::Tag(parse_tags(input)), surface)
            .await
    }

    /// Run one action against the active view and mirror its confirmation
    /// on the window and surface.
    pub async fn perform(
        &mut self,
        item_id: &str,
        action: ItemAction,
        surface: &mut dyn RenderSurface,
    ) -> Result<Confirmed> {
        let kind = action.kind();
        surface.notify(Notice::ActionPending(kind));

        match self.reconciler.apply(self.active, item_id, action).await {
            Ok(confirmed) => {
                self.apply_confirmed(&confirmed, surface);
                surface.notify(Notice::ActionDone(kind));
                Ok(confirmed)
            }
            Err(e) => {
                tracing::error!("{}", e);
                surface.notify(Notice::ActionFailed(kind));
                Err(e)
            }
        }
    }

    pub async fn create(
        &mut self,
        url: &str,
        tags: &str,
        surface: &mut dyn RenderSurface,
    ) -> Result<Created> {
        surface.notify(Notice::ActionPending(ActionKind::Create));

        let created = match self.reconciler.create(url, &parse_tags(tags)).await {
            Ok(created) => created,
            Err(e) => {
                tracing::error!("{}", e);
                surface.notify(Notice::ActionFailed(ActionKind::Create));
                return Err(e);
            }
        };

        if self.active == ViewKind::List && created.count.is_some() {
            self.insert_created(&created.item, surface);
            surface.set_count(created.count);
            surface.set_empty(false);
        }
        surface.notify(Notice::ActionDone(ActionKind::Create));

        Ok(created)
    }

    /// Resolve the url to open. Archives the item first when configured to
    /// and the list is active.
    pub async fn open(&mut self, item_id: &str, surface: &mut dyn RenderSurface) -> Result<String> {
        let url = self
            .find(item_id)
            .map(|item| item.url.clone())
            .ok_or_else(|| ShelfError::ItemNotFound(item_id.to_string()))?;

        if self.settings.archive_after_open && self.active == ViewKind::List {
            if let Err(e) = self.perform(item_id, ItemAction::Archive, surface).await {
                tracing::warn!("Archive after open failed: {}", e);
            }
        }

        Ok(url)
    }

    /// Forget every cached view.
    pub fn logout(&mut self, surface: &mut dyn RenderSurface) -> Result<()> {
        self.cache.clear()?;
        self.ordered.clear();
        self.window.reset();
        self.sentinel.reset();

        surface.clear(self.active);
        surface.set_count(None);
        surface.set_empty(false);
        tracing::info!("Cleared local cache");
        Ok(())
    }

    fn apply_confirmed(&mut self, confirmed: &Confirmed, surface: &mut dyn RenderSurface) {
        match confirmed {
            Confirmed::Removed {
                view,
                item_id,
                removal: Some(removal),
            } if *view == self.active => {
                self.remove_rendered(item_id, surface);
                surface.set_count(Some(removal.count));
                surface.set_empty(self.ordered.is_empty());
            }
            Confirmed::Updated {
                view,
                item: Some(item),
                ..
            } if *view == self.active => {
                if let Some(existing) = self.ordered.iter_mut().find(|i| i.id == item.id) {
                    *existing = item.clone();
                }
                surface.update(item);
            }
            _ => {}
        }
    }

    fn remove_rendered(&mut self, item_id: &str, surface: &mut dyn RenderSurface) {
        if let Some(index) = self.ordered.iter().position(|item| item.id == item_id) {
            self.ordered.remove(index);
            self.window.on_removed(index);
            surface.remove(item_id);
            // The last row may now be a different item under the same cursor
            self.sentinel.reset();
        }
    }

    fn insert_created(&mut self, item: &Item, surface: &mut dyn RenderSurface) {
        self.remove_rendered(&item.id, surface);

        let index = match self.settings.order {
            SortOrder::Asc => 0,
            SortOrder::Desc => self.ordered.len(),
        };
        self.ordered.insert(index, item.clone());

        if self.window.on_inserted(index, self.ordered.len()) {
            surface.insert(index, item);
        }
    }
}
