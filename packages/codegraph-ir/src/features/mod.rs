//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure business logic (no external dependencies)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - External dependency implementations

/// Source parsing: tree-sitter adapters per language, UCE tree construction.
pub mod parsing;

/// File discovery and content hashing, the pipeline's entry point.
pub mod scanning;

/// Entity extraction: hierarchical chunking of parsed files into indexable units.
pub mod chunking;

/// Call-graph linking: symbol tables, import resolution across files.
pub mod cross_file;

/// Regex-based data/taint flow detection for the semantic analyzer.
pub mod data_flow;

/// Side-effect and purity inference for the semantic analyzer.
pub mod effect_analysis;

/// IR-to-store row conversion (entities/edges batch construction).
pub mod graph_builder;

/// Full-text lexical retrieval leg (Tantivy-backed) and hybrid query fusion.
pub mod lexical;

/// Buffered append-only change log, flushed to the store and pruned on a retention window.
pub mod change_ledger;

/// Per-entity purpose/business-value inference with a clarification queue for low-confidence results.
pub mod justification;

/// Design-pattern classification by naming convention (singleton/factory/observer).
pub mod pattern_detection;
