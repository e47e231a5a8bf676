//! Persistence layer for the knowledge graph: the entity/edge/embedding
//! model, the `Store` port every other crate programs against, and one
//! SQLite-backed reference adapter.
//!
//! Callers never touch `infrastructure::sqlite` directly outside of
//! wiring code; everything is expressed against the `Store` trait so a
//! Datalog/HNSW-backed store can be swapped in without touching the
//! rest of the engine.

pub mod domain;
pub mod error;

#[cfg(feature = "sqlite")]
pub mod infrastructure;

pub use error::{ErrorKind, Result, StorageError};

pub use domain::{
    ChangeKind, ChangeLedgerEntry, CozoBatch, Edge, EdgeKind, Entity, EntityEmbedding, EntityKind,
    Justification, JustificationStatus, Store, StoreParams, StoreRow, VectorMatch,
};

#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteStore;
