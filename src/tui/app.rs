use ratatui::widgets::ListState;

use crate::domain::{ActionKind, Item, ViewKind};
use crate::sync::{Notice, RenderSurface};

/// Line-editing prompt shown in place of the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    ConfirmDelete { item_id: String, title: String },
    EditTags { item_id: String, input: String },
    AddUrl { input: String },
}

impl Prompt {
    pub fn input_mut(&mut self) -> Option<&mut String> {
        match self {
            Prompt::ConfirmDelete { .. } => None,
            Prompt::EditTags { input, .. } | Prompt::AddUrl { input } => Some(input),
        }
    }
}

pub const PAGE_SCROLL: u16 = 10;

pub struct TuiApp {
    pub view: ViewKind,
    pub items: Vec<Item>,
    pub count: Option<usize>,
    pub empty: bool,
    pub item_index: usize,
    pub preview_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub status_is_error: bool,
    pub is_refreshing: bool,
    pub maximized: bool,
    pub item_list_state: ListState,
    pub prompt: Option<Prompt>,
}

impl TuiApp {
    pub fn new(view: ViewKind) -> Self {
        let mut item_list_state = ListState::default();
        item_list_state.select(Some(0));

        Self {
            view,
            items: Vec::new(),
            count: None,
            empty: false,
            item_index: 0,
            preview_scroll: 0,
            should_quit: false,
            status_message: None,
            status_is_error: false,
            is_refreshing: false,
            maximized: false,
            item_list_state,
            prompt: None,
        }
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.items.get(self.item_index)
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected_item().map(|item| item.id.clone())
    }

    /// The cursor sits on the last materialized row.
    pub fn at_last_row(&self) -> bool {
        !self.items.is_empty() && self.item_index + 1 == self.items.len()
    }

    pub fn move_up(&mut self) {
        if self.maximized {
            self.preview_scroll = self.preview_scroll.saturating_sub(1);
        } else if self.item_index > 0 {
            self.select(self.item_index - 1);
        }
    }

    pub fn move_down(&mut self) {
        if self.maximized {
            self.preview_scroll = self.preview_scroll.saturating_add(1);
        } else if self.item_index + 1 < self.items.len() {
            self.select(self.item_index + 1);
        }
    }

    pub fn toggle_maximize(&mut self) {
        self.maximized = !self.maximized;
        self.preview_scroll = 0;
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_is_error = true;
    }

    fn select(&mut self, index: usize) {
        self.item_index = index;
        self.item_list_state.select(Some(index));
        self.preview_scroll = 0;
    }

    fn clamp_selection(&mut self) {
        let last = self.items.len().saturating_sub(1);
        self.select(self.item_index.min(last));
    }
}

impl RenderSurface for TuiApp {
    fn clear(&mut self, view: ViewKind) {
        self.view = view;
        self.items.clear();
        self.select(0);
    }

    fn append(&mut self, items: &[Item]) {
        self.items.extend_from_slice(items);
    }

    fn insert(&mut self, index: usize, item: &Item) {
        let index = index.min(self.items.len());
        self.items.insert(index, item.clone());
        // Keep the cursor on the same item
        if index <= self.item_index && self.items.len() > 1 {
            self.select(self.item_index + 1);
        }
    }

    fn remove(&mut self, item_id: &str) {
        if let Some(index) = self.items.iter().position(|item| item.id == item_id) {
            self.items.remove(index);
            if index < self.item_index {
                self.select(self.item_index - 1);
            }
            self.clamp_selection();
        }
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
        match notice {
            Notice::Synchronizing(_) => self.is_refreshing = true,
            Notice::Synchronized(_) | Notice::SyncFailed(_) | Notice::SyncSuperseded(_) => {
                self.is_refreshing = false
            }
            _ => {}
        }

        let failed = matches!(notice, Notice::SyncFailed(_) | Notice::ActionFailed(_));
        let message = notice_text(&notice);
        if failed {
            self.set_error(message);
        } else {
            self.set_status(message);
        }
    }
}

pub fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::Synchronizing(view) => format!("Synchronizing {}...", view.title()),
        Notice::Synchronized(view) => format!("{} is up to date", view.title()),
        Notice::SyncFailed(view) => format!("Could not synchronize {}", view.title()),
        Notice::SyncSuperseded(view) => {
            format!("{} was refreshed by a newer request", view.title())
        }
        Notice::Loading => "Loading more...".to_string(),
        Notice::EverythingLoaded => "Everything loaded".to_string(),
        Notice::ActionPending(kind) => format!("Sending {}...", kind),
        Notice::ActionDone(kind) => done_text(*kind).to_string(),
        Notice::ActionFailed(kind) => format!("Could not {} item", kind),
    }
}

fn done_text(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Favorite => "Added to favorites",
        ActionKind::Unfavorite => "Removed from favorites",
        ActionKind::Archive => "Archived",
        ActionKind::Unarchive => "Moved back to My List",
        ActionKind::Delete => "Deleted",
        ActionKind::Tag => "Tags saved",
        ActionKind::Create => "Saved to My List",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(ids: &[&str]) -> Vec<Item> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| Item::new(*id, i as i64, format!("https://example.com/{}", id)))
            .collect()
    }

    #[test]
    fn test_last_row_detection() {
        let mut app = TuiApp::new(ViewKind::List);
        assert!(!app.at_last_row());

        app.append(&items(&["a", "b"]));
        assert!(!app.at_last_row());
        app.move_down();
        assert!(app.at_last_row());
        app.move_down();
        assert_eq!(app.item_index, 1);
    }

    #[test]
    fn test_remove_keeps_cursor_on_item() {
        let mut app = TuiApp::new(ViewKind::List);
        app.append(&items(&["a", "b", "c"]));
        app.move_down();
        app.move_down();

        app.remove("a");
        assert_eq!(app.selected_id().as_deref(), Some("c"));

        app.remove("c");
        assert_eq!(app.selected_id().as_deref(), Some("b"));
    }

    #[test]
    fn test_insert_before_cursor_shifts_it() {
        let mut app = TuiApp::new(ViewKind::List);
        app.append(&items(&["a", "b"]));
        app.move_down();

        app.insert(0, &Item::new("new", -1, "https://example.com/new"));
        assert_eq!(app.selected_id().as_deref(), Some("b"));
    }

    #[test]
    fn test_notices_drive_status() {
        let mut app = TuiApp::new(ViewKind::List);

        app.notify(Notice::Synchronizing(ViewKind::Archive));
        assert!(app.is_refreshing);

        app.notify(Notice::SyncFailed(ViewKind::Archive));
        assert!(!app.is_refreshing);
        assert!(app.status_is_error);
        assert_eq!(app.status_message.as_deref(), Some("Could not synchronize Archive"));

        app.notify(Notice::ActionDone(ActionKind::Archive));
        assert!(!app.status_is_error);

        app.notify(Notice::Synchronizing(ViewKind::List));
        app.notify(Notice::SyncSuperseded(ViewKind::List));
        assert!(!app.is_refreshing);
    }

    #[test]
    fn test_prompt_input() {
        let mut prompt = Prompt::AddUrl {
            input: String::new(),
        };
        prompt.input_mut().unwrap().push_str("https://");
        assert_eq!(
            prompt,
            Prompt::AddUrl {
                input: "https://".into()
            }
        );

        let mut confirm = Prompt::ConfirmDelete {
            item_id: "1".into(),
            title: "x".into(),
        };
        assert!(confirm.input_mut().is_none());
    }
}
