//! Error types for the codegraph-ir crate
//!
//! Categorized error kinds matching the engine's error policy (§7):
//! each variant's `Display` is a one-line message suitable for a CLI
//! error; the source chain (via `with_source`) carries full context
//! for verbose/debug logging.

use std::fmt;

/// Error kind categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing/invalid config file - fatal at command start
    Configuration,
    /// No detectable project - fatal for that command
    ProjectDetection,
    /// Recoverable per-file parse failure
    Parse,
    /// Recoverable per-file entity extraction failure
    Extraction,
    /// Graph write failed
    Write,
    /// Store script referenced an unknown relation
    StoreMissingRelation,
    /// Vector search requested with no embeddings / no embedder
    VectorUnavailable,
    /// LLM router unavailable or exhausted retries
    LlmUnavailable,
    /// Lexical backend unavailable (degrades caller to semantic-only)
    LexicalUnavailable,
    /// Operation cancelled cooperatively
    Cancelled,
    /// Internal invariant violated (e.g. partially-written file)
    Integrity,
    /// Storage errors (database, serialization)
    Storage,
    /// Internal errors (bugs)
    Internal,
    /// IO errors
    IO,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::ProjectDetection => "project_detection",
            ErrorKind::Parse => "parse",
            ErrorKind::Extraction => "extraction",
            ErrorKind::Write => "write",
            ErrorKind::StoreMissingRelation => "store_missing_relation",
            ErrorKind::VectorUnavailable => "vector_unavailable",
            ErrorKind::LlmUnavailable => "llm_unavailable",
            ErrorKind::LexicalUnavailable => "lexical_unavailable",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Integrity => "integrity",
            ErrorKind::Storage => "storage",
            ErrorKind::Internal => "internal",
            ErrorKind::IO => "io",
        }
    }

    /// Whether this kind is recoverable per-file (processing continues
    /// with the remaining files) rather than fatal for the whole run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Parse
                | ErrorKind::Extraction
                | ErrorKind::LlmUnavailable
                | ErrorKind::LexicalUnavailable
                | ErrorKind::VectorUnavailable
        )
    }
}

/// Unified error type
#[derive(Debug)]
pub struct CodegraphError {
    pub kind: ErrorKind,
    pub message: String,
    pub file_path: Option<String>,
    pub line: Option<u32>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CodegraphError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file_path: None,
            line: None,
            source: None,
        }
    }

    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn project_detection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProjectDetection, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Extraction, message)
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Write, message)
    }

    pub fn store_missing_relation(relation: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreMissingRelation, relation)
    }

    pub fn vector_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VectorUnavailable, message)
    }

    pub fn llm_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LlmUnavailable, message)
    }

    pub fn lexical_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LexicalUnavailable, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "operation cancelled")
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Integrity, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::configuration(message)
    }
}

impl fmt::Display for CodegraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)?;
        if let Some(ref file) = self.file_path {
            write!(f, " in {}", file)?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for CodegraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CodegraphError>;

impl From<serde_json::Error> for CodegraphError {
    fn from(err: serde_json::Error) -> Self {
        CodegraphError::storage(format!("JSON serialization error: {}", err)).with_source(err)
    }
}

impl From<codegraph_storage::StorageError> for CodegraphError {
    fn from(err: codegraph_storage::StorageError) -> Self {
        use codegraph_storage::ErrorKind as StoreKind;
        let kind = match err.kind {
            StoreKind::MissingRelation => ErrorKind::StoreMissingRelation,
            StoreKind::VectorUnavailable => ErrorKind::VectorUnavailable,
            _ => ErrorKind::Storage,
        };
        let message = err.message.clone();
        CodegraphError::new(kind, message).with_source(err)
    }
}

impl<T> From<std::sync::PoisonError<T>> for CodegraphError {
    fn from(_err: std::sync::PoisonError<T>) -> Self {
        CodegraphError::internal("Mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodegraphError::parse("unexpected token")
            .with_file("test.py")
            .with_line(42);

        let msg = format!("{}", err);
        assert!(msg.contains("parse"));
        assert!(msg.contains("unexpected token"));
        assert!(msg.contains("test.py"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn recoverable_kinds_match_spec() {
        assert!(ErrorKind::Parse.is_recoverable());
        assert!(ErrorKind::Extraction.is_recoverable());
        assert!(!ErrorKind::Configuration.is_recoverable());
        assert!(!ErrorKind::ProjectDetection.is_recoverable());
    }

    #[test]
    fn from_storage_error_maps_missing_relation() {
        let storage_err = codegraph_storage::StorageError::missing_relation("entities_v2");
        let err: CodegraphError = storage_err.into();
        assert_eq!(err.kind, ErrorKind::StoreMissingRelation);
    }
}
