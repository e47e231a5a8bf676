//! Domain models backing the external-interface ports (§6): values that
//! cross a port boundary but aren't already covered by `shared::models`
//! (the UCE tree) or `codegraph_storage` (the graph/store types).

use serde::{Deserialize, Serialize};

use crate::shared::models::{Edge, Node};

/// A parsed file in the Universal Code Entity tree: a flat list of
/// nodes and edges scoped to one file, independent of source language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UceFile {
    pub file_path: String,
    pub language: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl UceFile {
    pub fn new(file_path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            language: language.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }
}

/// One embedding call's result, per the Embedding service interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResult {
    pub vector: Vec<f32>,
    pub model: String,
    pub text_hash: String,
}

/// One line match within a lexical search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineMatch {
    pub line: String,
    pub line_number: u32,
}

/// One file's worth of lexical matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalFileResult {
    pub file_name: String,
    pub line_matches: Vec<LineMatch>,
}

/// Lexical backend search options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexicalSearchOptions {
    pub file_pattern: Option<String>,
    pub max_results: Option<usize>,
}

/// Lexical backend response: either results or a recorded error string
/// (a dead backend degrades the caller to semantic-only rather than failing).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexicalSearchResponse {
    pub results: Vec<LexicalFileResult>,
    pub error: Option<String>,
}

/// LLM inference options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmInferOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// One LLM inference result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmInferResult {
    pub text: String,
    pub model_id: String,
}

/// A single vector search hit as returned across the port boundary
/// (distinct from `codegraph_storage::VectorMatch`, which is the
/// store's internal row shape: this one resolves `fileId` / `name`
/// for direct presentation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSearchHit {
    pub id: String,
    pub file_id: Option<String>,
    pub name: Option<String>,
    pub distance: f32,
}
