//! JSON-file result store.
//!
//! Single source of truth for processing history: a mapping from category
//! name to an ordered list of entries, with the reserved `dones` category
//! always present. The whole structure is loaded into memory at open and
//! rewritten to disk after every mutation — O(store size) per write, the
//! accepted cost for modest stores. Single-writer, single-process access
//! only; concurrent mutation of the same backing file is undefined.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::diag::{SharedDiagnostics, tracing_sink};
use crate::error::Result;
use crate::hash::content_id;
use crate::model::{DONES, Entry, is_empty_item};

/// Category store backed by one JSON file.
pub struct Store {
    path: PathBuf,
    categories: BTreeMap<String, Vec<Entry>>,
    diag: SharedDiagnostics,
}

impl Store {
    /// Open a store at the given path, creating intermediate directories
    /// for the backing file. A missing or corrupt file falls back to the
    /// empty default structure; only directory-creation failures are errors.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, tracing_sink())
    }

    /// Open with an explicit diagnostics sink.
    pub fn open_with(path: impl AsRef<Path>, diag: SharedDiagnostics) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let categories = load_categories(&path);
        Ok(Self {
            path,
            categories,
            diag,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Record an item under one or more categories.
    ///
    /// Builds one entry (id and timestamp computed once) and appends an
    /// independent clone to every named category, creating categories on
    /// first write, then persists the whole store. An empty item is a
    /// warning and a no-op.
    pub fn record(
        &mut self,
        item: &Value,
        categories: &[&str],
        message: Option<&str>,
    ) -> Result<()> {
        if is_empty_item(item) {
            self.diag.warn("empty item passed to record, skipping");
            return Ok(());
        }

        let entry = Entry::new(item, message);
        let id = entry.id.clone();
        for name in categories {
            self.categories
                .entry((*name).to_owned())
                .or_default()
                .push(entry.clone());
        }
        self.save()?;

        let total: usize = categories
            .iter()
            .map(|name| self.categories.get(*name).map_or(0, Vec::len))
            .sum();
        self.diag.info(&format!(
            "recorded {id} under [{}] (total {total})",
            categories.join(", ")
        ));
        Ok(())
    }

    /// Mark an item done. Appends to the `dones` category only — recording
    /// under custom categories never suppresses an item from the stream;
    /// this is the one signal that does. An empty item is a warning and a
    /// no-op.
    pub fn mark_done(&mut self, item: &Value, message: Option<&str>) -> Result<()> {
        if is_empty_item(item) {
            self.diag.warn("empty item passed to mark_done, skipping");
            return Ok(());
        }

        let entry = Entry::new(item, message);
        let id = entry.id.clone();
        self.categories.entry(DONES.to_owned()).or_default().push(entry);
        self.save()?;

        let total = self.categories[DONES].len();
        self.diag.info(&format!("marked {id} done (dones total {total})"));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Check whether an item has been recorded under any of the given
    /// categories. Computes the item's id once, scans each category's
    /// entries in order, and short-circuits on the first match. A category
    /// absent from the store is a warning, not an error, and is skipped.
    pub fn exists(&self, item: &Value, categories: &[&str]) -> bool {
        let id = content_id(item);
        for name in categories {
            let Some(entries) = self.categories.get(*name) else {
                self.diag
                    .warn(&format!("category \"{name}\" not found in store"));
                continue;
            };
            if entries.iter().any(|entry| entry.id == id) {
                self.diag
                    .info(&format!("item {id} found in category \"{name}\""));
                return true;
            }
        }
        false
    }

    /// Whether an id is present in the `dones` category.
    pub fn is_done(&self, id: &str) -> bool {
        self.categories
            .get(DONES)
            .is_some_and(|entries| entries.iter().any(|entry| entry.id == id))
    }

    /// Entries recorded under a category, if it exists.
    pub fn category(&self, name: &str) -> Option<&[Entry]> {
        self.categories.get(name).map(Vec::as_slice)
    }

    /// All categories with their entries.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[Entry])> {
        self.categories
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Rewrite the whole store: serialize with stable indentation, write to
    /// a sibling temp file, rename over the backing path. Write failures
    /// propagate — silently losing a dedup record would break the
    /// exactly-once invariant.
    fn save(&self) -> Result<()> {
        let mut text = serde_json::to_string_pretty(&self.categories)?;
        text.push('\n');

        let tmp = tmp_path(&self.path);
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Parse the backing file into the category map. Missing or malformed
/// content silently recovers to the empty default; either way the `dones`
/// category ends up present.
fn load_categories(path: &Path) -> BTreeMap<String, Vec<Entry>> {
    let mut categories: BTreeMap<String, Vec<Entry>> = fs::read_to_string(path)
        .ok()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default();
    categories.entry(DONES.to_owned()).or_default();
    categories
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{CaptureSink, Severity};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.json");
        fs::write(&path, "this is not valid json {{{").unwrap();

        let store = Store::open(&path).unwrap();
        assert_eq!(store.category(DONES), Some(&[][..]));
        assert_eq!(store.categories().count(), 1);
    }

    #[test]
    fn dones_is_initialized_when_absent_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.json");
        fs::write(&path, r#"{"custom": []}"#).unwrap();

        let store = Store::open(&path).unwrap();
        assert!(store.category(DONES).is_some());
        assert!(store.category("custom").is_some());
    }

    #[test]
    fn open_creates_intermediate_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/b/output.json");

        let mut store = Store::open(&path).unwrap();
        store.mark_done(&json!({"x": 1}), None).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.json");

        let mut store = Store::open(&path).unwrap();
        store.mark_done(&json!({"x": 1}), None).unwrap();
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn empty_item_is_warned_and_ignored() {
        let dir = tempdir().unwrap();
        let sink = CaptureSink::new();
        let mut store =
            Store::open_with(dir.path().join("output.json"), sink.clone()).unwrap();

        store.record(&json!({}), &["custom"], None).unwrap();
        store.mark_done(&json!(null), None).unwrap();

        assert!(store.category("custom").is_none());
        assert_eq!(store.category(DONES).unwrap().len(), 0);
        assert_eq!(sink.at(Severity::Warn).len(), 2);
    }

    #[test]
    fn store_file_preserves_non_ascii_item_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.json");
        let mut store = Store::open(&path).unwrap();
        store.mark_done(&json!({"name": "café"}), None).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("café"));
    }
}
