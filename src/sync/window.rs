//! In-memory cursor over a view's snapshot for virtualized rendering.

pub const DEFAULT_PAGE_SIZE: usize = 18;

#[derive(Debug, Clone)]
pub struct PaginationWindow {
    page_size: usize,
    shown: usize,
    exhausted: bool,
}

impl PaginationWindow {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            shown: 0,
            exhausted: false,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of items already materialized on the render surface.
    pub fn shown(&self) -> usize {
        self.shown
    }

    /// True once a `next_slice` came back empty; cleared only by `reset`.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn reset(&mut self) {
        self.shown = 0;
        self.exhausted = false;
    }

    pub fn first_slice<'a, T>(&mut self, items: &'a [T]) -> &'a [T] {
        self.reset();
        let end = self.page_size.min(items.len());
        self.shown = end;
        &items[..end]
    }

    pub fn next_slice<'a, T>(&mut self, items: &'a [T]) -> &'a [T] {
        if self.exhausted || self.shown >= items.len() {
            self.exhausted = true;
            return &[];
        }

        let start = self.shown;
        let end = (start + self.page_size).min(items.len());
        self.shown = end;
        tracing::debug!("Window advanced to {}/{}", end, items.len());
        &items[start..end]
    }

    /// Account for the item at `index` leaving the snapshot.
    pub fn on_removed(&mut self, index: usize) {
        if index < self.shown {
            self.shown -= 1;
        }
    }

    /// Account for an item inserted at `index`; `new_len` includes it.
    ///
    /// Returns true when the item lands inside the materialized range and
    /// must be rendered now. Items past the frontier arrive with a later slice.
    pub fn on_inserted(&mut self, index: usize, new_len: usize) -> bool {
        let fully_shown = self.shown + 1 == new_len;
        if index < self.shown || (index == self.shown && fully_shown) {
            self.shown += 1;
            true
        } else {
            false
        }
    }
}

impl Default for PaginationWindow {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Edge detector for the "end of list is visible" signal.
///
/// Fires once per hidden-to-visible crossing, never while the signal stays
/// high, so each crossing requests at most one slice.
#[derive(Debug, Clone, Default)]
pub struct Sentinel {
    visible: bool,
}

impl Sentinel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current visibility; returns true on a rising edge.
    pub fn observe(&mut self, visible: bool) -> bool {
        let fired = visible && !self.visible;
        self.visible = visible;
        fired
    }

    pub fn reset(&mut self) {
        self.visible = false;
    }
}
