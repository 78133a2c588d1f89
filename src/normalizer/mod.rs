use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;

use crate::app::{Result, ShelfError};
use crate::domain::Item;
use crate::remote::{ItemPayload, RetrieveResponse};

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Convert a whole retrieve response, sorted ascending by sort key.
    ///
    /// Any malformed entry rejects the whole response.
    pub fn normalize_list(&self, response: RetrieveResponse) -> Result<Vec<Item>> {
        let mut items = response
            .into_payloads()?
            .into_iter()
            .map(|payload| {
                let sort_key = Self::sort_key(&payload)?;
                self.normalize_item(payload, sort_key)
            })
            .collect::<Result<Vec<_>>>()?;

        items.sort_by_key(|item| item.sort_key);
        Ok(items)
    }

    /// Convert a single payload, using `sort_key` as its position.
    pub fn normalize_item(&self, payload: ItemPayload, sort_key: i64) -> Result<Item> {
        let tags = payload.tag_names();

        let id = payload
            .item_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ShelfError::MalformedPayload("item without item_id".into()))?;

        let url = non_empty(payload.resolved_url)
            .or_else(|| non_empty(payload.given_url))
            .ok_or_else(|| ShelfError::MalformedPayload(format!("item {} has no url", id)))?;

        let title = non_empty(payload.title)
            .or_else(|| non_empty(payload.given_title))
            .or_else(|| non_empty(payload.resolved_title))
            .map(|t| decode_html_entities(&t).to_string())
            .unwrap_or_else(|| url.clone());

        let excerpt = non_empty(payload.excerpt).map(|e| decode_html_entities(&e).to_string());

        let added_at = match payload.time_added.as_deref() {
            Some(raw) => parse_timestamp(raw).ok_or_else(|| {
                ShelfError::MalformedPayload(format!("item {} has bad time_added {}", id, raw))
            })?,
            None => DateTime::<Utc>::default(),
        };

        Ok(Item {
            id,
            sort_key,
            title,
            url,
            excerpt,
            favorited: payload.favorite.as_deref() == Some("1"),
            tags: tags.into_iter().collect(),
            added_at,
        })
    }

    fn sort_key(payload: &ItemPayload) -> Result<i64> {
        let raw = payload.sort_id.as_deref().ok_or_else(|| {
            ShelfError::MalformedPayload(format!(
                "item {} has no sort_id",
                payload.item_id.as_deref().unwrap_or("?")
            ))
        })?;

        raw.trim()
            .parse()
            .map_err(|_| ShelfError::MalformedPayload(format!("bad sort_id: {}", raw)))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = raw.trim().parse().ok()?;
    DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(id: &str, sort_id: &str) -> ItemPayload {
        ItemPayload {
            item_id: Some(id.into()),
            sort_id: Some(sort_id.into()),
            given_url: Some(format!("https://example.com/{}", id)),
            ..Default::default()
        }
    }

    #[test]
    fn test_list_sorted_ascending() {
        let response =
            RetrieveResponse::from_items(vec![payload("1", "2"), payload("2", "1"), payload("3", "0")]);
        let items = Normalizer::new().normalize_list(response).unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn test_empty_list() {
        let response: RetrieveResponse = serde_json::from_str(r#"{"list": []}"#).unwrap();
        assert!(Normalizer::new().normalize_list(response).unwrap().is_empty());
    }

    #[test]
    fn test_missing_sort_id_rejects_response() {
        let mut bad = payload("2", "0");
        bad.sort_id = None;
        let response = RetrieveResponse::from_items(vec![payload("1", "1"), bad]);
        assert!(matches!(
            Normalizer::new().normalize_list(response),
            Err(ShelfError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_missing_url_is_malformed() {
        let mut bad = payload("1", "0");
        bad.given_url = None;
        assert!(Normalizer::new().normalize_item(bad, 0).is_err());
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let mut bad = payload("1", "0");
        bad.item_id = None;
        assert!(Normalizer::new().normalize_item(bad, 0).is_err());
    }

    #[test]
    fn test_zero_id_is_an_ordinary_id() {
        let response = RetrieveResponse::from_items(vec![payload("0", "1"), payload("7", "0")]);
        let items = Normalizer::new().normalize_list(response).unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "0"]);
    }

    #[test]
    fn test_resolved_url_preferred() {
        let mut p = payload("1", "0");
        p.resolved_url = Some("https://resolved.example.com/".into());
        let item = Normalizer::new().normalize_item(p, 0).unwrap();
        assert_eq!(item.url, "https://resolved.example.com/");
    }

    #[test]
    fn test_title_fallbacks() {
        let normalizer = Normalizer::new();

        let mut p = payload("1", "0");
        p.resolved_title = Some("Resolved".into());
        assert_eq!(normalizer.normalize_item(p.clone(), 0).unwrap().title, "Resolved");

        p.given_title = Some("Given".into());
        assert_eq!(normalizer.normalize_item(p.clone(), 0).unwrap().title, "Given");

        let p = payload("2", "0");
        assert_eq!(
            normalizer.normalize_item(p, 0).unwrap().title,
            "https://example.com/2"
        );
    }

    #[test]
    fn test_entities_decoded() {
        let mut p = payload("1", "0");
        p.given_title = Some("Rust &amp; Friends".into());
        p.excerpt = Some("It&#39;s here".into());
        let item = Normalizer::new().normalize_item(p, 0).unwrap();
        assert_eq!(item.title, "Rust & Friends");
        assert_eq!(item.excerpt.as_deref(), Some("It's here"));
    }

    #[test]
    fn test_flags_tags_and_time() {
        let p: ItemPayload = serde_json::from_str(
            r#"{"item_id": "9", "sort_id": 0, "given_url": "https://example.com",
                "favorite": "1", "time_added": "1700000000",
                "tags": {"rust": {}, "async": {}}}"#,
        )
        .unwrap();
        let item = Normalizer::new().normalize_item(p, 0).unwrap();
        assert!(item.favorited);
        assert_eq!(item.added_at.timestamp(), 1_700_000_000);
        assert!(item.tags.contains("rust"));
        assert!(item.tags.contains("async"));
    }

    #[test]
    fn test_bad_time_added_is_malformed() {
        let mut p = payload("1", "0");
        p.time_added = Some("yesterday".into());
        assert!(Normalizer::new().normalize_item(p, 0).is_err());
    }
}
