//! Scanner domain model.

use serde::{Deserialize, Serialize};

/// One surviving file from a project scan. `id` is derived from
/// `relative_path` alone (never from `hash`), so a rename produces a
/// new id and the old one is picked up as deleted by the Incremental
/// Updater rather than treated as a modification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: String,
    pub absolute_path: String,
    pub relative_path: String,
    pub hash: String,
    pub byte_size: u64,
}

impl FileInfo {
    pub fn new(absolute_path: String, relative_path: String, hash: String, byte_size: u64) -> Self {
        Self {
            id: file_id(&relative_path),
            absolute_path,
            relative_path,
            hash,
            byte_size,
        }
    }
}

/// Derives a stable file id from a path relative to the project root.
pub fn file_id(relative_path: &str) -> String {
    format!("file:{relative_path}")
}
