pub mod sqlite;

use crate::app::Result;

pub use sqlite::SqliteStore;

/// Durable string key/value storage shared by every view.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Write all entries in order, all or nothing.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;
    fn clear(&self) -> Result<()>;
}
