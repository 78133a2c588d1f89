use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// Canonical remote ordering; snapshots are kept ascending on this key.
    pub sort_key: i64,
    pub title: String,
    pub url: String,
    pub excerpt: Option<String>,
    pub favorited: bool,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub added_at: DateTime<Utc>,
}

impl Item {
    pub fn new(id: impl Into<String>, sort_key: i64, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sort_key,
            title: String::new(),
            url: url.into(),
            excerpt: None,
            favorited: false,
            tags: BTreeSet::new(),
            added_at: Utc::now(),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    /// Host part of the item url, without a leading `www.`.
    pub fn domain(&self) -> Option<String> {
        let url = Url::parse(&self.url).ok()?;
        let host = url.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }

    pub fn tags_label(&self) -> String {
        self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_with_title() {
        let mut item = Item::new("1", 0, "https://example.com/a");
        item.title = "My Article".into();
        assert_eq!(item.display_title(), "My Article");
    }

    #[test]
    fn test_display_title_falls_back_to_url() {
        let item = Item::new("1", 0, "https://example.com/a");
        assert_eq!(item.display_title(), "https://example.com/a");
    }

    #[test]
    fn test_domain() {
        let item = Item::new("1", 0, "https://www.example.com/posts/1?x=y");
        assert_eq!(item.domain().as_deref(), Some("example.com"));

        let item = Item::new("2", 0, "http://blog.rust-lang.org/");
        assert_eq!(item.domain().as_deref(), Some("blog.rust-lang.org"));

        let item = Item::new("3", 0, "not a url");
        assert_eq!(item.domain(), None);
    }

    #[test]
    fn test_snapshot_json_uses_epoch_seconds() {
        let mut item = Item::new("9", 3, "https://example.com");
        item.added_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        item.tags.insert("rust".into());

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["added_at"], 1_700_000_000);
        assert_eq!(json["tags"][0], "rust");

        let back: Item = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_tags_label() {
        let mut item = Item::new("1", 0, "https://example.com");
        assert_eq!(item.tags_label(), "");
        item.tags.insert("b".into());
        item.tags.insert("a".into());
        assert_eq!(item.tags_label(), "a, b");
    }
}
