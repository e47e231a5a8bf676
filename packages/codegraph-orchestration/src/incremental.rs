//! Incremental Updater: diffs a fresh scan against the file hashes the
//! last run persisted and drives the Graph Writer only for what
//! changed.
//!
//! Unlike a full index, this never re-parses unaffected files: a file
//! survives untouched whenever its content hash still matches the
//! `files` relation's stored row.

use std::collections::HashMap;
use std::sync::Arc;

use codegraph_ir::features::graph_builder::write_file_extraction;
use codegraph_ir::features::parsing::{create_full_registry, extract_file};
use codegraph_ir::features::scanning::{scan_project, FileInfo, ScanOptions};
use codegraph_storage::{Store, StoreParams};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{OrchestratorError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeDetectionResult {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub unchanged: Vec<String>,
    pub deleted: Vec<String>,
}

impl ChangeDetectionResult {
    fn files_to_write(&self) -> impl Iterator<Item = &String> {
        self.added.iter().chain(self.modified.iter())
    }
}

/// Diffs `scanned` against the store's `files` relation. A file is
/// `added` when its id is absent from the store, `modified` when the
/// id is known but the hash differs, `unchanged` when both match, and
/// every stored id missing from `scanned` is `deleted`.
pub fn detect_changes(scanned: &[FileInfo], stored: &HashMap<String, String>) -> ChangeDetectionResult {
    let mut result = ChangeDetectionResult {
        added: Vec::new(),
        modified: Vec::new(),
        unchanged: Vec::new(),
        deleted: Vec::new(),
    };

    let mut seen_ids = std::collections::HashSet::new();
    for file in scanned {
        seen_ids.insert(file.id.clone());
        match stored.get(&file.id) {
            None => result.added.push(file.relative_path.clone()),
            Some(prev_hash) if prev_hash != &file.hash => result.modified.push(file.relative_path.clone()),
            Some(_) => result.unchanged.push(file.relative_path.clone()),
        }
    }

    for (id, _) in stored {
        if !seen_ids.contains(id) {
            result.deleted.push(id.clone());
        }
    }

    result
}

/// Outcome of running the incremental updater once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalResult {
    pub changes: ChangeDetectionResult,
    pub files_written: usize,
    pub files_deleted: usize,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

/// Drives a single hash-diff incremental update over `repo_id`'s
/// project root against `store`.
pub struct IncrementalUpdater {
    repo_id: String,
    store: Arc<dyn Store>,
}

impl IncrementalUpdater {
    pub fn new(repo_id: String, store: Arc<dyn Store>) -> Self {
        Self { repo_id, store }
    }

    /// Reads the store's current `(id, hash)` pairs for every indexed file.
    async fn stored_hashes(&self) -> Result<HashMap<String, String>> {
        let rows = self
            .store
            .query("SELECT id, hash FROM files", StoreParams::new())
            .await
            .map_err(OrchestratorError::Store)?;

        let mut hashes = HashMap::with_capacity(rows.len());
        for row in rows {
            let id = row.get("id").and_then(|v| v.as_str()).map(String::from);
            let hash = row.get("hash").and_then(|v| v.as_str()).map(String::from);
            if let (Some(id), Some(hash)) = (id, hash) {
                hashes.insert(id, hash);
            }
        }
        Ok(hashes)
    }

    /// Scans `scan_options.root_path`, diffs against the store, and
    /// writes added/modified files while purging deleted ones. Relative
    /// paths in the returned result are rooted at `scan_options.root_path`.
    pub async fn run(&self, scan_options: &ScanOptions) -> Result<IncrementalResult> {
        let start = std::time::Instant::now();

        let scanned = scan_project(scan_options).map_err(|e| OrchestratorError::Parse(e.to_string()))?;
        let stored = self.stored_hashes().await?;
        let changes = detect_changes(&scanned, &stored);

        info!(
            "IncrementalUpdater: {} added, {} modified, {} unchanged, {} deleted",
            changes.added.len(),
            changes.modified.len(),
            changes.unchanged.len(),
            changes.deleted.len()
        );

        let by_relative_path: HashMap<&str, &FileInfo> =
            scanned.iter().map(|f| (f.relative_path.as_str(), f)).collect();

        let registry = create_full_registry();
        let mut files_written = 0;
        let mut errors = Vec::new();

        for relative_path in changes.files_to_write() {
            let Some(file) = by_relative_path.get(relative_path.as_str()) else {
                continue;
            };
            let absolute_path = std::path::Path::new(&file.absolute_path);
            let content = match std::fs::read_to_string(absolute_path) {
                Ok(c) => c,
                Err(e) => {
                    warn!("IncrementalUpdater: failed to read {relative_path}: {e}");
                    errors.push(format!("{relative_path}: {e}"));
                    continue;
                }
            };

            let extraction = match extract_file(&registry, &self.repo_id, relative_path, &content) {
                Ok(r) => r,
                Err(e) => {
                    warn!("IncrementalUpdater: failed to extract {relative_path}: {e}");
                    errors.push(format!("{relative_path}: {e}"));
                    continue;
                }
            };

            match write_file_extraction(self.store.as_ref(), file, &extraction).await {
                Ok(()) => files_written += 1,
                Err(e) => {
                    warn!("IncrementalUpdater: failed to write {relative_path}: {e}");
                    errors.push(format!("{relative_path}: {e}"));
                }
            }
        }

        let mut files_deleted = 0;
        for id in &changes.deleted {
            let relative_path = id.strip_prefix("file:").unwrap_or(id);
            match self.store.delete_file(relative_path).await {
                Ok(()) => files_deleted += 1,
                Err(e) => {
                    warn!("IncrementalUpdater: failed to delete {relative_path}: {e}");
                    errors.push(format!("{relative_path}: {e}"));
                }
            }
        }

        Ok(IncrementalResult {
            changes,
            files_written,
            files_deleted,
            errors,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_storage::SqliteStore;

    async fn open_store() -> Arc<dyn Store> {
        let store = SqliteStore::open_in_memory().expect("open in-memory store");
        store.initialize().await.expect("initialize schema");
        Arc::new(store)
    }

    fn file(id: &str, relative_path: &str, hash: &str) -> FileInfo {
        FileInfo::new(relative_path.to_string(), relative_path.to_string(), hash.to_string(), 0)
    }

    #[test]
    fn classifies_added_modified_unchanged_and_deleted() {
        let scanned = vec![
            file("file:a.py", "a.py", "h1"),
            file("file:b.py", "b.py", "h2-new"),
            file("file:c.py", "c.py", "h3"),
        ];
        let mut stored = HashMap::new();
        stored.insert("file:b.py".to_string(), "h2-old".to_string());
        stored.insert("file:c.py".to_string(), "h3".to_string());
        stored.insert("file:d.py".to_string(), "h4".to_string());

        let result = detect_changes(&scanned, &stored);

        assert_eq!(result.added, vec!["a.py".to_string()]);
        assert_eq!(result.modified, vec!["b.py".to_string()]);
        assert_eq!(result.unchanged, vec!["c.py".to_string()]);
        assert_eq!(result.deleted, vec!["file:d.py".to_string()]);
    }

    #[tokio::test]
    async fn run_writes_new_files_and_records_their_hash() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "def one():\n    pass\n").unwrap();

        let store = open_store().await;
        let updater = IncrementalUpdater::new("repo".to_string(), store.clone());
        let options = ScanOptions::new(dir.path()).with_include(vec!["**/*.py".to_string()]);

        let result = updater.run(&options).await.unwrap();
        assert_eq!(result.changes.added.len(), 1);
        assert_eq!(result.files_written, 1);
        assert!(result.errors.is_empty());

        let rows = store
            .query("SELECT id FROM entities", StoreParams::new())
            .await
            .unwrap();
        assert!(!rows.is_empty());
    }

    #[tokio::test]
    async fn rerun_with_no_changes_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "def one():\n    pass\n").unwrap();

        let store = open_store().await;
        let updater = IncrementalUpdater::new("repo".to_string(), store.clone());
        let options = ScanOptions::new(dir.path()).with_include(vec!["**/*.py".to_string()]);

        updater.run(&options).await.unwrap();
        let second = updater.run(&options).await.unwrap();

        assert!(second.changes.added.is_empty());
        assert!(second.changes.modified.is_empty());
        assert_eq!(second.changes.unchanged.len(), 1);
        assert_eq!(second.files_written, 0);
    }

    #[tokio::test]
    async fn deleting_a_file_purges_its_entities() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("a.py");
        std::fs::write(&file_path, "def one():\n    pass\n").unwrap();

        let store = open_store().await;
        let updater = IncrementalUpdater::new("repo".to_string(), store.clone());
        let options = ScanOptions::new(dir.path()).with_include(vec!["**/*.py".to_string()]);
        updater.run(&options).await.unwrap();

        std::fs::remove_file(&file_path).unwrap();
        let result = updater.run(&options).await.unwrap();

        assert_eq!(result.changes.deleted.len(), 1);
        assert_eq!(result.files_deleted, 1);

        let rows = store
            .query("SELECT id FROM entities", StoreParams::new())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
