//! Lexical search leg: Tantivy-backed full-text index plus the query
//! router that fuses it with other retrieval legs.
//!
//! # Architecture
//!
//! ```text
//! FileToIndex -> QueryRouter -> TantivyLexicalIndex -> Tantivy Index
//! ```
//!
//! 3-gram + CamelCase tokenization ("getUserName" -> ["get", "User",
//! "Name"]), BM25 ranking, RRF fusion across retrieval legs in
//! `query_router`.

pub mod extractor;
pub mod query_router;
pub mod schema;
pub mod tantivy_index;
pub mod tokenizer;

// Re-exports
pub use extractor::{ExtractedFields, FieldExtractor, RegexExtractor};
pub use query_router::{
    Filter, HybridResult, HybridSearchConfig, QueryIntent, QueryRouter, SearchRequest, SearchResponse,
};
pub use schema::{build_schema, FIELD_CONTENT, FIELD_FILE_PATH, FIELD_REPO_ID};
pub use tantivy_index::{IndexingMode, SearchHit, TantivyLexicalIndex};
pub use tokenizer::{build_code_analyzer, build_ngram_analyzer, CamelCaseTokenizer};

use crate::shared::models::error::{CodegraphError, ErrorKind};

/// File to index (immutable)
#[derive(Debug, Clone)]
pub struct FileToIndex {
    pub repo_id: String,
    pub file_path: String,
    pub content: String,
}

impl FileToIndex {
    pub fn new(
        repo_id: impl Into<String>,
        file_path: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, CodegraphError> {
        let repo_id = repo_id.into();
        let file_path = file_path.into();
        let content = content.into();

        if repo_id.is_empty() {
            return Err(CodegraphError::new(
                ErrorKind::LexicalUnavailable,
                "repo_id cannot be empty",
            ));
        }
        if file_path.is_empty() {
            return Err(CodegraphError::new(
                ErrorKind::LexicalUnavailable,
                "file_path cannot be empty",
            ));
        }

        Ok(Self {
            repo_id,
            file_path,
            content,
        })
    }
}

/// Indexing result (batch operation)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IndexingResult {
    pub total_files: usize,
    pub success_count: usize,
    #[serde(rename = "failures")]
    pub failed_files: Vec<(String, String)>, // (file_path, error)
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
}

impl IndexingResult {
    pub fn is_complete_success(&self) -> bool {
        self.success_count == self.total_files
    }

    pub fn is_partial_success(&self) -> bool {
        self.success_count > 0 && self.success_count < self.total_files
    }

    pub fn is_complete_failure(&self) -> bool {
        self.success_count == 0
    }

    pub fn throughput(&self) -> f64 {
        self.success_count as f64 / self.duration_seconds.max(0.001)
    }
}
