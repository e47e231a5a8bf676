/*
 * Codegraph IR - local code-intelligence engine core
 *
 * Feature-First Hexagonal Architecture:
 * - shared/   : Common models (Node, Edge, Span)
 * - domain/   : Universal Code Entity model and the Parser/Embedder/
 *               LexicalBackend/LlmRouter ports (Store lives in
 *               codegraph-storage and is re-exported from here)
 * - features/ : Vertical slices (scanning, parsing, chunking, cross_file
 *               linking, data_flow, effect_analysis, graph_builder,
 *               lexical, change_ledger, justification)
 * - config/   : Project configuration
 * - api/      : Read-only query surface over a built graph
 */

#![allow(clippy::too_many_arguments)]

pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod features;
pub mod shared;

pub use domain::models::UceFile;
pub use domain::ports::{Embedder, LexicalBackend, LlmRouter, Parser, Store};
pub use errors::{CodegraphError, ErrorKind, Result};
