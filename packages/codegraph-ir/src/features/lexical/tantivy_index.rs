//! Tantivy-backed lexical index: tokenizes file content into a 7-field
//! schema and serves BM25 search over it.
//!
//! ```text
//! FileToIndex -> Extractor -> TantivyDocument -> IndexWriter -> Tantivy Index
//! ```

use crate::features::lexical::{
    extractor::{FieldExtractor, RegexExtractor},
    schema::SchemaFields,
    FileToIndex, IndexingResult,
};
use crate::shared::models::error::{CodegraphError, ErrorKind};

use rayon::prelude::*;
use std::path::Path;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use std::time::{Instant, SystemTime};
use tantivy::{
    collector::TopDocs, doc, query::QueryParser, schema::Value, DateTime, Index, IndexWriter, Term,
};

/// Indexing mode (same as Python TantivyCodeIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexingMode {
    /// CONSERVATIVE: Only index clearly identifiable code
    Conservative,
    /// BALANCED: Default mode (Python default)
    Balanced,
    /// AGGRESSIVE: Index everything including tests, generated code
    Aggressive,
}

impl Default for IndexingMode {
    fn default() -> Self {
        IndexingMode::Balanced
    }
}

/// Tantivy-based lexical search index.
pub struct TantivyLexicalIndex {
    /// Tantivy index
    index: Index,

    /// Index writer (thread-safe)
    writer: Arc<Mutex<IndexWriter>>,

    /// Schema fields (cached)
    schema_fields: SchemaFields,

    /// Indexing mode
    mode: IndexingMode,

    /// Repository ID
    repo_id: String,

    /// Statistics
    total_files_indexed: AtomicU64,
    total_updates: AtomicU64,
}

impl TantivyLexicalIndex {
    /// Get repository ID
    pub fn get_repo_id(&self) -> &str {
        &self.repo_id
    }

    /// Create a new Tantivy lexical index.
    pub fn new(index_dir: &Path, repo_id: String, mode: IndexingMode) -> Result<Self, CodegraphError> {
        let schema_fields = SchemaFields::new();

        // Create Tantivy index
        let index = if index_dir.exists() {
            Index::open_in_dir(index_dir).map_err(|e| {
                CodegraphError::new(
                    ErrorKind::LexicalUnavailable,
                    format!("failed to open index: {}", e),
                )
            })?
        } else {
            std::fs::create_dir_all(index_dir).map_err(|e| {
                CodegraphError::new(
                    ErrorKind::LexicalUnavailable,
                    format!("failed to create index dir: {}", e),
                )
            })?;
            Index::create_in_dir(index_dir, schema_fields.schema.clone()).map_err(|e| {
                CodegraphError::new(
                    ErrorKind::LexicalUnavailable,
                    format!("failed to create index: {}", e),
                )
            })?
        };

        // Create writer with parallel threads
        let writer = index.writer(50_000_000).map_err(|e| {
            CodegraphError::new(
                ErrorKind::LexicalUnavailable,
                format!("failed to create writer: {}", e),
            )
        })?;

        Ok(Self {
            index,
            writer: Arc::new(Mutex::new(writer)),
            schema_fields,
            mode,
            repo_id,
            total_files_indexed: AtomicU64::new(0),
            total_updates: AtomicU64::new(0),
        })
    }

    /// Index files in batch (parallel).
    ///
    /// Same as Python `index_files_batch()` (code_index.py:334-458).
    pub fn index_files_batch(
        &self,
        files: &[FileToIndex],
        fail_fast: bool,
    ) -> Result<IndexingResult, CodegraphError> {
        let start = Instant::now();

        // Build documents in parallel
        let doc_results: Vec<_> = files
            .par_iter()
            .map(|file| self.build_document(file))
            .collect();

        // Separate successes and failures
        let mut success_count = 0;
        let mut failed_files = Vec::new();
        let mut documents: Vec<tantivy::TantivyDocument> = Vec::new();

        for (file, result) in files.iter().zip(doc_results) {
            match result {
                Ok(doc) => {
                    documents.push(doc);
                    success_count += 1;
                }
                Err(e) => {
                    failed_files.push((file.file_path.clone(), e.to_string()));
                    if fail_fast {
                        return Err(CodegraphError::new(ErrorKind::LexicalUnavailable, format!(
                            "Failed to index {}: {}",
                            file.file_path, e
                        )));
                    }
                }
            }
        }

        // Atomic upsert (delete + add) - same as Python
        let mut writer = self.writer.lock().unwrap();

        for (file, doc) in files.iter().zip(&documents) {
            // Delete existing documents for this file
            let file_term = Term::from_field_text(self.schema_fields.file_path, &file.file_path);
            writer.delete_term(file_term);

            // Add new document
            writer
                .add_document(doc.clone())
                .map_err(|e| CodegraphError::new(ErrorKind::LexicalUnavailable, format!("Failed to add document: {}", e)))?;
        }

        // Commit
        writer
            .commit()
            .map_err(|e| CodegraphError::new(ErrorKind::LexicalUnavailable, format!("Failed to commit: {}", e)))?;

        drop(writer);

        // Update statistics
        self.total_files_indexed
            .fetch_add(success_count as u64, Ordering::Relaxed);
        self.total_updates.fetch_add(1, Ordering::Relaxed);

        let duration = start.elapsed();

        Ok(IndexingResult {
            total_files: files.len(),
            success_count,
            failed_files,
            duration_seconds: duration.as_secs_f64(),
        })
    }

    /// Build a Tantivy document from file.
    ///
    /// Same as Python `_build_document()` (code_index.py:273-310).
    fn build_document(&self, file: &FileToIndex) -> Result<tantivy::TantivyDocument, CodegraphError> {
        // Extract fields using Tree-sitter or regex fallback
        let fields = RegexExtractor::extract(&file.content); // Simplified for now

        // Build Tantivy document (7-field schema) using doc! macro
        let timestamp = DateTime::from_timestamp_secs(
            SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap()
                .as_secs() as i64,
        );

        // Build document with all fields
        let mut doc = doc!(
            self.schema_fields.content => file.content.clone(),
            self.schema_fields.file_path => file.file_path.clone(),
            self.schema_fields.repo_id => file.repo_id.clone(),
            self.schema_fields.indexed_at => timestamp,
        );

        // Add optional searchable fields if not empty
        if !fields.string_literals.is_empty() {
            doc.add_text(self.schema_fields.string_literals, &fields.string_literals);
        }
        if !fields.comments.is_empty() {
            doc.add_text(self.schema_fields.comments, &fields.comments);
        }
        if !fields.docstrings.is_empty() {
            doc.add_text(self.schema_fields.docstring, &fields.docstrings);
        }

        Ok(doc)
    }

    /// Search the index (BM25).
    ///
    /// Same as Python `search()` (code_index.py:486-557).
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, CodegraphError> {
        let reader = self
            .index
            .reader()
            .map_err(|e| CodegraphError::new(ErrorKind::LexicalUnavailable, format!("Failed to create reader: {}", e)))?;

        let searcher = reader.searcher();

        // Build query parser (search across content, comments, docstrings)
        let query_parser = QueryParser::for_index(
            &self.index,
            vec![
                self.schema_fields.content,
                self.schema_fields.comments,
                self.schema_fields.docstring,
                self.schema_fields.string_literals,
            ],
        );

        let parsed_query = query_parser
            .parse_query(query)
            .map_err(|e| CodegraphError::new(ErrorKind::LexicalUnavailable, format!("Invalid query: {}", e)))?;

        // Search
        let top_docs = searcher
            .search(&parsed_query, &TopDocs::with_limit(limit))
            .map_err(|e| CodegraphError::new(ErrorKind::LexicalUnavailable, format!("Search failed: {}", e)))?;

        // Convert to SearchHit
        let mut hits = Vec::new();
        for (score, doc_address) in top_docs {
            let doc: tantivy::TantivyDocument = searcher
                .doc(doc_address)
                .map_err(|e| CodegraphError::new(ErrorKind::LexicalUnavailable, format!("Failed to retrieve doc: {}", e)))?;

            // Extract fields
            let file_path = doc
                .get_first(self.schema_fields.file_path)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();

            let content = doc
                .get_first(self.schema_fields.content)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();

            hits.push(SearchHit {
                file_path,
                content,
                score: score as f64,
                line: None,     // Requires storing line_number in index schema
                chunk_id: None, // Requires chunk_id field in index schema
            });
        }

        Ok(hits)
    }
}

/// Search result hit.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchHit {
    pub file_path: String,
    pub content: String,
    pub score: f64,
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_index_and_search() {
        let temp_dir = TempDir::new().unwrap();
        let index_dir = temp_dir.path().join("index");

        let index =
            TantivyLexicalIndex::new(&index_dir, "test_repo".to_string(), IndexingMode::Balanced)
                .unwrap();

        // Index a file
        let files = vec![FileToIndex {
            repo_id: "test_repo".to_string(),
            file_path: "src/main.rs".to_string(),
            content: r#"
            fn main() {
                println!("Hello, World!");
            }
            "#
            .to_string(),
        }];

        let result = index.index_files_batch(&files, false).unwrap();
        assert_eq!(result.success_count, 1);

        // Search
        let hits = index.search("Hello", 10).unwrap();
        assert!(!hits.is_empty());
        assert!(hits[0].content.contains("Hello, World!"));
    }

    #[test]
    fn test_batch_indexing() {
        let temp_dir = TempDir::new().unwrap();
        let index_dir = temp_dir.path().join("index");

        let index =
            TantivyLexicalIndex::new(&index_dir, "test_repo".to_string(), IndexingMode::Balanced)
                .unwrap();

        // Index multiple files
        let files = (0..10)
            .map(|i| FileToIndex {
                repo_id: "test_repo".to_string(),
                file_path: format!("file{}.rs", i),
                content: format!("fn function_{}() {{}}", i),
            })
            .collect::<Vec<_>>();

        let result = index.index_files_batch(&files, false).unwrap();
        assert_eq!(result.success_count, 10);
    }
}
