//! Error types for codegraph-ir
//!
//! Re-exports the unified, kind-tagged `CodegraphError` defined in
//! `shared::models::error` so callers outside `shared` have a
//! top-level path to reach for.

pub use crate::shared::models::error::{CodegraphError, ErrorKind, Result};
