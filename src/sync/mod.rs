//! The local cache and synchronization engine.

pub mod cache;
pub mod controller;
pub mod reconciler;
pub mod surface;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{RefreshOutcome, Removal, ViewCache};
pub use controller::{Rendered, ViewController, ViewSettings};
pub use reconciler::{ActionReconciler, Confirmed, Created};
pub use surface::{MemorySurface, Notice, RenderSurface};
pub use window::{PaginationWindow, Sentinel, DEFAULT_PAGE_SIZE};
