//! Content-addressed identity for structured items.
//!
//! An item's id is the SHA-256 of its canonical JSON form: object keys
//! sorted lexicographically at every nesting level, arrays in order,
//! scalars in their standard JSON rendering. Structurally-equal values
//! produce byte-identical canonical text regardless of original key order,
//! so they hash to the same id.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Compute the stable content id of an item: hex digest of its canonical
/// serialization. Deterministic across process restarts and key reordering.
pub fn content_id(item: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(item).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Render a value as canonical JSON: compact, object keys sorted at every
/// level. Every `Value` has a canonical form, so this cannot fail.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // String keys serialize infallibly.
                out.push_str(&serde_json::to_string(key).unwrap_or_default());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // Scalars already have a single standard rendering.
        scalar => out.push_str(&scalar.to_string()),
    }
}
