//! Wire shapes exchanged with the remote service.
//!
//! The service is loose with types: ids and flags arrive as strings or
//! numbers, and an empty `list` is sent as `[]` rather than `{}`.

use serde::{de, Deserialize, Deserializer, Serialize};
#[cfg(test)]
use serde_json::Map;
use serde_json::Value;

use crate::app::{Result, ShelfError};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemPayload {
    #[serde(default, deserialize_with = "string_or_number")]
    pub item_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sort_id: Option<String>,
    #[serde(default)]
    pub given_url: Option<String>,
    #[serde(default)]
    pub resolved_url: Option<String>,
    #[serde(default)]
    pub given_title: Option<String>,
    #[serde(default)]
    pub resolved_title: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub favorite: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub time_added: Option<String>,
    #[serde(default)]
    pub tags: Option<Value>,
}

impl ItemPayload {
    /// Tag names are the keys of the `tags` object.
    pub fn tag_names(&self) -> Vec<String> {
        match &self.tags {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

/// Response of the retrieve endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrieveResponse {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub list: Option<Value>,
}

impl RetrieveResponse {
    #[cfg(test)]
    pub fn from_items(items: Vec<ItemPayload>) -> Self {
        let list = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let key = item.item_id.clone().unwrap_or_else(|| i.to_string());
                (key, payload_to_value(&item))
            })
            .collect::<Map<_, _>>();

        Self {
            status: Some(1),
            list: Some(Value::Object(list)),
        }
    }

    /// Decode the `list` map into payloads, in no particular order.
    pub fn into_payloads(self) -> Result<Vec<ItemPayload>> {
        let list = self
            .list
            .ok_or_else(|| ShelfError::MalformedPayload("response has no list".into()))?;

        match list {
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| {
                    serde_json::from_value(value).map_err(|e| {
                        ShelfError::MalformedPayload(format!("item {}: {}", key, e))
                    })
                })
                .collect(),
            Value::Array(entries) if entries.is_empty() => Ok(Vec::new()),
            Value::Array(entries) => entries
                .into_iter()
                .map(|value| {
                    serde_json::from_value(value)
                        .map_err(|e| ShelfError::MalformedPayload(e.to_string()))
                })
                .collect(),
            other => Err(ShelfError::MalformedPayload(format!(
                "list is neither an object nor an array: {}",
                other
            ))),
        }
    }
}

/// Response of the send (action batch) endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub action_results: Vec<Value>,
    #[serde(default)]
    pub item: Option<ItemPayload>,
}

impl SendResponse {
    #[cfg(test)]
    pub fn accepted(results: usize) -> Self {
        Self {
            status: Some(1),
            action_results: vec![Value::Bool(true); results],
            item: None,
        }
    }

    /// The batch counts as confirmed only if the service accepted every action.
    pub fn ensure_accepted(&self) -> Result<()> {
        if let Some(status) = self.status {
            if status != 1 {
                return Err(ShelfError::Remote(format!(
                    "action batch rejected with status {}",
                    status
                )));
            }
        }

        if self.action_results.iter().any(|r| matches!(r, Value::Bool(false))) {
            return Err(ShelfError::Remote("action rejected by service".into()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    pub time: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddResponse {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub item: Option<ItemPayload>,
}

#[cfg(test)]
fn payload_to_value(item: &ItemPayload) -> Value {
    let mut map = Map::new();
    let mut put = |key: &str, value: &Option<String>| {
        if let Some(v) = value {
            map.insert(key.to_string(), Value::String(v.clone()));
        }
    };
    put("item_id", &item.item_id);
    put("sort_id", &item.sort_id);
    put("given_url", &item.given_url);
    put("resolved_url", &item.resolved_url);
    put("given_title", &item.given_title);
    put("resolved_title", &item.resolved_title);
    put("title", &item.title);
    put("excerpt", &item.excerpt);
    put("favorite", &item.favorite);
    put("time_added", &item.time_added);
    if let Some(tags) = &item.tags {
        map.insert("tags".into(), tags.clone());
    }
    Value::Object(map)
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(if b { "1" } else { "0" }.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
