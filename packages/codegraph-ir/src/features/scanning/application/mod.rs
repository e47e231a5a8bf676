//! Scan use case: directory walk + include/exclude filtering + content
//! hashing, producing the `FileInfo` stream the Indexer Coordinator and
//! Incremental Updater both consume.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::domain::FileInfo;
use crate::shared::models::error::{CodegraphError, ErrorKind};

/// Project scope for a scan: root plus include/exclude glob patterns.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root_path: PathBuf,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl ScanOptions {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            include_patterns: vec!["**/*".to_string()],
            exclude_patterns: Vec::new(),
        }
    }

    pub fn with_include(mut self, patterns: Vec<String>) -> Self {
        self.include_patterns = patterns;
        self
    }

    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }
}

/// Walks `options.root_path`, keeps files matching an include pattern
/// and no exclude pattern, and hashes each survivor's raw bytes.
/// Hash idempotence holds because the digest is a pure function of
/// file content: re-scanning unchanged content yields the same hash.
pub fn scan_project(options: &ScanOptions) -> Result<Vec<FileInfo>, CodegraphError> {
    let includes: Vec<_> = options.include_patterns.iter().map(|p| glob_to_regex(p)).collect();
    let excludes: Vec<_> = options.exclude_patterns.iter().map(|p| glob_to_regex(p)).collect();

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(&options.root_path)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let absolute_path = entry.path();
        let relative_path = match absolute_path.strip_prefix(&options.root_path) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let relative_str = normalize_path(relative_path);

        if !includes.iter().any(|re| re.is_match(&relative_str)) {
            continue;
        }
        if excludes.iter().any(|re| re.is_match(&relative_str)) {
            continue;
        }

        let bytes = std::fs::read(absolute_path).map_err(|e| {
            CodegraphError::new(ErrorKind::IO, format!("failed to read {}: {e}", absolute_path.display()))
        })?;
        let hash = hash_bytes(&bytes);

        files.push(FileInfo::new(
            absolute_path.display().to_string(),
            relative_str,
            hash,
            bytes.len() as u64,
        ));
    }

    Ok(files)
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn hash_bytes(bytes: &[u8]) -> String {
    hash_content(bytes)
}

/// SHA-256 content hash, exposed so callers that already hold file
/// bytes (e.g. a stage re-hashing on write) don't need to re-walk the
/// filesystem through `scan_project` just to get a hash.
pub fn hash_content(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Translates a simplified glob (`**`, `*`, `?`) into an anchored regex.
/// `**` matches across path separators, `*` matches within a segment,
/// `?` matches a single character.
fn glob_to_regex(pattern: &str) -> regex::Regex {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        out.push_str("(?:.*/)?");
                    } else {
                        out.push_str(".*");
                    }
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            '.' | '+' | '(' | ')' | '|' | '^' | '$' | '[' | ']' | '{' | '}' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out.push('$');
    regex::Regex::new(&out).unwrap_or_else(|_| regex::Regex::new("$^").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scans_and_hashes_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), b"print(1)").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

        let options = ScanOptions::new(dir.path()).with_include(vec!["**/*.py".to_string()]);
        let files = scan_project(&options).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "a.py");
        assert_eq!(files[0].byte_size, 8);
    }

    #[test]
    fn hash_is_idempotent_across_rescans() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), b"print(1)").unwrap();
        let options = ScanOptions::new(dir.path());

        let first = scan_project(&options).unwrap();
        let second = scan_project(&options).unwrap();

        assert_eq!(first[0].hash, second[0].hash);
    }

    #[test]
    fn exclude_patterns_win_over_include() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("vendor/lib.py"), b"x = 1").unwrap();
        fs::write(dir.path().join("main.py"), b"x = 1").unwrap();

        let options = ScanOptions::new(dir.path())
            .with_include(vec!["**/*.py".to_string()])
            .with_exclude(vec!["vendor/**".to_string()]);
        let files = scan_project(&options).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "main.py");
    }

    #[test]
    fn content_change_produces_different_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        fs::write(&path, b"print(1)").unwrap();
        let options = ScanOptions::new(dir.path());
        let before = scan_project(&options).unwrap();

        fs::write(&path, b"print(2)").unwrap();
        let after = scan_project(&options).unwrap();

        assert_ne!(before[0].hash, after[0].hash);
    }
}
