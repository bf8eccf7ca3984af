//! Core data model.
//!
//! An entry is one persisted record of an item's processing event. Entries
//! are immutable once written — re-processing the same item appends a new
//! entry rather than replacing an old one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hash::content_id;

/// Reserved category consumed by the item stream for skip decisions.
/// Recording under any other category never suppresses an item from the
/// stream; only `dones` does.
pub const DONES: &str = "dones";

/// Conventional category for `Store::record` / `Store::exists` when the
/// caller has no better label.
pub const DEFAULT_CATEGORY: &str = "endpoint";

/// One persisted record of an item's processing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,

    /// Content id of `item` (hex digest of its canonical form).
    pub id: String,

    /// The original structured value, stored faithfully.
    pub item: Value,

    /// Optional caller message (e.g. an error string on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Entry {
    /// Build an entry for `item`, computing its content id once.
    pub fn new(item: &Value, message: Option<&str>) -> Self {
        Self {
            timestamp: Utc::now(),
            id: content_id(item),
            item: item.clone(),
            message: message.map(str::to_owned),
        }
    }
}

/// Truthiness test for items, matching the store's "non-empty" contract:
/// `null`, `false`, zero numbers, `""`, `[]`, and `{}` are all empty.
pub fn is_empty_item(item: &Value) -> bool {
    match item {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_item_covers_all_falsy_shapes() {
        for v in [
            json!(null),
            json!(false),
            json!(0),
            json!(0.0),
            json!(""),
            json!([]),
            json!({}),
        ] {
            assert!(is_empty_item(&v), "{v} should be empty");
        }
    }

    #[test]
    fn non_empty_items_pass() {
        for v in [json!(true), json!(1), json!("x"), json!([0]), json!({"a": null})] {
            assert!(!is_empty_item(&v), "{v} should be non-empty");
        }
    }

    #[test]
    fn absent_message_is_omitted_from_json() {
        let entry = Entry::new(&json!({"a": 1}), None);
        let text = serde_json::to_string(&entry).unwrap();
        assert!(!text.contains("message"));

        let entry = Entry::new(&json!({"a": 1}), Some("failed"));
        let text = serde_json::to_string(&entry).unwrap();
        assert!(text.contains("\"message\":\"failed\""));
    }
}
