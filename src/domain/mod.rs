pub mod action;
pub mod item;
pub mod view;

pub use action::{join_tags, parse_tags, ActionKind, ActionRequest, ItemAction, PendingAction};
pub use item::Item;
pub use view::{SortOrder, StateFilter, ViewKind};
