//! Pending-item stream over an input queue file.
//!
//! Reads the input as a single JSON list and yields, in source order, the
//! items not yet marked done in the store. The stream holds a shared handle
//! to the store so skip decisions consult live `dones` state: a caller that
//! marks each yielded item done will also skip later duplicates within the
//! same run. Re-invoking [`ItemStream::generate`] re-reads the input and
//! re-evaluates against the store's current `dones`, so whole-program reruns
//! resume where the previous run left off.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;

use crate::diag::{SharedDiagnostics, tracing_sink};
use crate::hash::content_id;
use crate::model::is_empty_item;
use crate::store::Store;

/// Lazy source of not-yet-done work items.
pub struct ItemStream {
    input_path: PathBuf,
    store: Rc<RefCell<Store>>,
    diag: SharedDiagnostics,
}

impl ItemStream {
    pub fn new(input_path: impl AsRef<Path>, store: Rc<RefCell<Store>>) -> Self {
        Self::with_diagnostics(input_path, store, tracing_sink())
    }

    pub fn with_diagnostics(
        input_path: impl AsRef<Path>,
        store: Rc<RefCell<Store>>,
        diag: SharedDiagnostics,
    ) -> Self {
        Self {
            input_path: input_path.as_ref().to_path_buf(),
            store,
            diag,
        }
    }

    /// Read and parse the input file, returning an iterator over pending
    /// items. A missing or malformed input, or a non-list top level, is an
    /// error diagnostic and an empty iterator — reported, not propagated.
    pub fn generate(&self) -> Pending {
        let text = match fs::read_to_string(&self.input_path) {
            Ok(text) => text,
            Err(err) => {
                self.diag.error(&format!(
                    "cannot read input file {}: {err}",
                    self.input_path.display()
                ));
                return Pending::failed(self.store.clone(), self.diag.clone());
            }
        };

        let parsed: Value = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.diag.error(&format!(
                    "invalid JSON in input file {}: {err}",
                    self.input_path.display()
                ));
                return Pending::failed(self.store.clone(), self.diag.clone());
            }
        };

        let Value::Array(items) = parsed else {
            self.diag
                .error("input file must contain a top-level list of items");
            return Pending::failed(self.store.clone(), self.diag.clone());
        };

        Pending {
            total: items.len(),
            items,
            next: 0,
            processed: 0,
            skipped: 0,
            exhausted: false,
            store: self.store.clone(),
            diag: self.diag.clone(),
        }
    }
}

/// Iterator over the pending items of one `generate()` call.
///
/// Emits one summary diagnostic (total / processed / skipped) when naturally
/// exhausted. Dropping the iterator early emits nothing.
pub struct Pending {
    items: Vec<Value>,
    next: usize,
    total: usize,
    processed: usize,
    skipped: usize,
    exhausted: bool,
    store: Rc<RefCell<Store>>,
    diag: SharedDiagnostics,
}

impl Pending {
    /// An already-exhausted stream for input failures: yields nothing and
    /// never emits a summary.
    fn failed(store: Rc<RefCell<Store>>, diag: SharedDiagnostics) -> Self {
        Self {
            items: Vec::new(),
            next: 0,
            total: 0,
            processed: 0,
            skipped: 0,
            exhausted: true,
            store,
            diag,
        }
    }

    /// Items yielded so far.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Items skipped so far, whether empty or already done.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for Pending {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        while self.next < self.items.len() {
            let index = self.next;
            self.next += 1;
            let item = &self.items[index];

            if is_empty_item(item) {
                self.skipped += 1;
                self.diag
                    .warn(&format!("empty item at index {index}, skipping"));
                continue;
            }

            let id = content_id(item);
            if self.store.borrow().is_done(&id) {
                self.skipped += 1;
                self.diag
                    .info(&format!("item {id} found in \"dones\", skipping"));
                continue;
            }

            self.processed += 1;
            self.diag.info(&format!("item preview: {}", preview(item)));
            self.diag
                .info(&format!("processing item at index {index} with id {id}"));
            return Some(item.clone());
        }

        if !self.exhausted {
            self.exhausted = true;
            self.diag.info(&format!(
                "stream summary: total {}, processed {}, skipped {}",
                self.total, self.processed, self.skipped
            ));
        }
        None
    }
}

/// Compact rendering of an item, truncated to 100 characters for log lines.
fn preview(item: &Value) -> String {
    let text = item.to_string();
    if text.chars().count() <= 100 {
        return text;
    }
    let truncated: String = text.chars().take(100).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preview_truncates_long_items() {
        let long = json!({"text": "x".repeat(200)});
        let rendered = preview(&long);
        assert_eq!(rendered.chars().count(), 103);
        assert!(rendered.ends_with("..."));
    }

    #[test]
    fn preview_leaves_short_items_alone() {
        assert_eq!(preview(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
