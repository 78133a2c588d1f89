use crate::domain::{ActionKind, Item, ViewKind};

/// Status messages for the user, left unformatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Synchronizing(ViewKind),
    Synchronized(ViewKind),
    SyncFailed(ViewKind),
    /// A newer refresh of the view took over.
    SyncSuperseded(ViewKind),
    Loading,
    EverythingLoaded,
    ActionPending(ActionKind),
    ActionDone(ActionKind),
    ActionFailed(ActionKind),
}

/// Consumer of slices and per-item updates, e.g. a terminal list.
///
/// Positions are indexes into the rendered sequence.
pub trait RenderSurface {
    /// Drop everything rendered so far.
    fn clear(&mut self, view: ViewKind);
    fn append(&mut self, items: &[Item]);
    fn insert(&mut self, index: usize, item: &Item);
    fn remove(&mut self, item_id: &str);
    fn update(&mut self, item: &Item);
    fn set_count(&mut self, count: Option<usize>);
    /// Toggle the "nothing here" indicator.
    fn set_empty(&mut self, empty: bool);
    fn notify(&mut self, notice: Notice);
}

/// A surface that keeps everything in memory. Used by the CLI and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    pub view: Option<ViewKind>,
    pub items: Vec<Item>,
    pub count: Option<usize>,
    pub empty: bool,
    pub notices: Vec<Notice>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl RenderSurface for MemorySurface {
    fn clear(&mut self, view: ViewKind) {
        self.view = Some(view);
        self.items.clear();
    }

    fn append(&mut self, items: &[Item]) {
        self.items.extend_from_slice(items);
    }

    fn insert(&mut self, index: usize, item: &Item) {
        let index = index.min(self.items.len());
        self.items.insert(index, item.clone());
    }

    fn remove(&mut self, item_id: &str) {
        self.items.retain(|item| item.id != item_id);
    }

    fn update(&mut self, item: &Item) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            *existing = item.clone();
        }
    }

    fn set_count(&mut self, count: Option<usize>) {
        self.count = count;
    }

    fn set_empty(&mut self, empty: bool) {
        self.empty = empty;
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
