//! Scanner + Hasher: walks a project root, filters by include/exclude
//! patterns, and emits a `FileInfo` per surviving file with a stable
//! content hash for incremental diffing.

pub mod application;
pub mod domain;

pub use application::{hash_content, scan_project, ScanOptions};
pub use domain::FileInfo;
