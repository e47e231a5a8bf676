//! Domain Ports - Interfaces for external dependencies (§6)
//!
//! HEXAGONAL ARCHITECTURE: the domain defines these interfaces,
//! infrastructure adapters implement them. `Store` itself lives in
//! `codegraph_storage` (it has its own domain model) and is re-exported
//! here so callers only need one `use` for every port.

use async_trait::async_trait;

use super::models::{
    EmbeddingResult, LexicalSearchOptions, LexicalSearchResponse, LlmInferOptions,
    LlmInferResult, UceFile,
};
use crate::errors::Result;

pub use codegraph_storage::Store;

/// Port: source parser, producing a Universal Code Entity tree per file.
#[async_trait]
pub trait Parser: Send + Sync {
    async fn initialize(&self) -> Result<()>;
    async fn close(&self) -> Result<()>;

    async fn parse_file(&self, path: &str) -> Result<UceFile>;
    fn parse_code(&self, code: &str, language: &str) -> Result<UceFile>;

    fn supported_languages(&self) -> &[&str];
    fn supports(&self, path: &str) -> bool;
}

/// Port: embedding model runner. Vector dimensionality is fixed across
/// the lifetime of a store.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn initialize(&self) -> Result<()>;
    async fn embed(&self, text: &str) -> Result<EmbeddingResult>;
    async fn shutdown(&self) -> Result<()>;
}

/// Port: lexical (full-text) retrieval backend, process-managed by the
/// orchestrator. A dead backend degrades callers to semantic-only.
#[async_trait]
pub trait LexicalBackend: Send + Sync {
    async fn search(&self, query: &str, options: LexicalSearchOptions) -> LexicalSearchResponse;
}

/// Port: LLM router, abstracting local vs. cloud-provider inference.
/// `shutdown` must be called exactly once.
#[async_trait]
pub trait LlmRouter: Send + Sync {
    async fn infer(&self, prompt: &str, options: LlmInferOptions) -> Result<LlmInferResult>;
    async fn shutdown(&self) -> Result<()>;
}
