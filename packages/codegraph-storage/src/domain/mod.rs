//! Entity/relationship model and the `Store` port.
//!
//! The knowledge graph is a property graph of typed entities and typed
//! edges, persisted by whatever concrete store sits behind the `Store`
//! trait. This crate ships one reference adapter (`infrastructure::sqlite`)
//! that keeps entities/edges as rows and embeddings as a brute-force
//! scan table; a Datalog/HNSW-backed store can implement the same trait
//! without any caller-visible change.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// Entity kinds recognized by the graph. `GhostNode` stands in for a
/// symbol defined outside the indexed project (an external package
/// import that was never itself parsed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    File,
    Function,
    Method,
    Class,
    Interface,
    TypeAlias,
    Variable,
    GhostNode,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::File => "file",
            EntityKind::Function => "function",
            EntityKind::Method => "method",
            EntityKind::Class => "class",
            EntityKind::Interface => "interface",
            EntityKind::TypeAlias => "type_alias",
            EntityKind::Variable => "variable",
            EntityKind::GhostNode => "ghost_node",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "file" => Some(EntityKind::File),
            "function" => Some(EntityKind::Function),
            "method" => Some(EntityKind::Method),
            "class" => Some(EntityKind::Class),
            "interface" => Some(EntityKind::Interface),
            "type_alias" => Some(EntityKind::TypeAlias),
            "variable" => Some(EntityKind::Variable),
            "ghost_node" => Some(EntityKind::GhostNode),
            _ => None,
        }
    }
}

/// A node in the knowledge graph.
///
/// `id` is stable across re-indexes of the same file as long as the
/// entity's qualified name doesn't change (see the Graph Writer's
/// delete-then-insert policy). `ghost:<pkg>:<symbol>` is reserved for
/// `GhostNode` ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
    pub qualified_name: String,
    pub file_path: Option<String>,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    pub language: Option<String>,
    pub signature: Option<String>,
    pub visibility: Option<String>,
    pub metadata: serde_json::Value,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: EntityKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            kind,
            qualified_name: name.clone(),
            name,
            file_path: None,
            start_line: None,
            end_line: None,
            language: None,
            signature: None,
            visibility: None,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn ghost(package: &str, symbol: &str) -> Self {
        let id = format!("ghost:{package}:{symbol}");
        let mut entity = Self::new(id, EntityKind::GhostNode, symbol);
        entity.qualified_name = format!("{package}.{symbol}");
        entity.metadata = serde_json::json!({ "package": package, "symbol": symbol });
        entity
    }
}

/// Edge kinds recognized by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    Contains,
    Calls,
    Imports,
    Extends,
    Implements,
    ExtendsInterface,
    HasMethod,
    UsesType,
    ReferencesExternal,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contains => "CONTAINS",
            EdgeKind::Calls => "CALLS",
            EdgeKind::Imports => "IMPORTS",
            EdgeKind::Extends => "EXTENDS",
            EdgeKind::Implements => "IMPLEMENTS",
            EdgeKind::ExtendsInterface => "EXTENDS_INTERFACE",
            EdgeKind::HasMethod => "HAS_METHOD",
            EdgeKind::UsesType => "USES_TYPE",
            EdgeKind::ReferencesExternal => "REFERENCES_EXTERNAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from_id: String,
    pub to_id: String,
    pub kind: EdgeKind,
    pub metadata: serde_json::Value,
}

impl Edge {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            kind,
            metadata: serde_json::Value::Null,
        }
    }
}

/// A vector for one chunk of an entity's source, produced by the
/// Embedder port and stored for the semantic leg of hybrid search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityEmbedding {
    pub entity_id: String,
    pub chunk_id: String,
    pub vector: Vec<f32>,
    pub model: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JustificationStatus {
    Pending,
    Confirmed,
    NeedsClarification,
}

/// The Justification Engine's inferred purpose/business-value record
/// for a single entity, along with its confidence and review state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Justification {
    pub entity_id: String,
    pub purpose: String,
    pub business_value: Option<String>,
    pub confidence: f32,
    pub status: JustificationStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// One append-only Change Ledger row. `seq` is assigned by the store
/// on insert and is monotonically increasing within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLedgerEntry {
    pub seq: Option<i64>,
    pub file_path: String,
    pub change_kind: ChangeKind,
    pub content_hash: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// One row's worth of typed values for a single store relation, in
/// column-array form: `CozoBatch` groups many of these by relation
/// name so the Graph Writer can ship a whole file's entities/edges in
/// one round trip.
pub type StoreRow = HashMap<String, serde_json::Value>;

/// A batch of rows grouped by target relation name, e.g.
/// `{"entities": [...], "edges": [...]}`. Mirrors the row-array shape
/// a Datalog store expects for a bulk insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CozoBatch {
    pub relations: HashMap<String, Vec<StoreRow>>,
}

impl CozoBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, relation: &str, row: StoreRow) {
        self.relations.entry(relation.to_string()).or_default().push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.relations.values().all(|rows| rows.is_empty())
    }
}

/// A single semantic-leg hit from `vector_search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    pub entity_id: String,
    pub chunk_id: String,
    pub score: f32,
}

/// Bound parameters for a parameterized `execute`/`query` call. Always
/// prefer this over interpolating values into the script string.
pub type StoreParams = HashMap<String, serde_json::Value>;

/// The store port: every persistence and retrieval operation the rest
/// of the engine needs, expressed against an assumed Datalog-style
/// script surface plus a vector search escape hatch. One relation-row
/// adapter (`infrastructure::sqlite::SqliteStore`) implements this over
/// `rusqlite` with a brute-force vector scan in place of an external
/// HNSW index.
#[async_trait]
pub trait Store: Send + Sync {
    async fn initialize(&self) -> Result<()>;

    async fn close(&self) -> Result<()>;

    /// Run a script with no expected result rows (DDL, inserts, deletes).
    async fn execute(&self, script: &str, params: StoreParams) -> Result<()>;

    /// Run a script and collect its result rows.
    async fn query(&self, script: &str, params: StoreParams) -> Result<Vec<StoreRow>>;

    /// Insert a whole batch of rows in one transaction, relation by relation.
    async fn write_batch(&self, batch: CozoBatch) -> Result<()>;

    /// Deletes every entity, edge, embedding, and justification rooted
    /// at `file_path`, plus its hash record, ahead of either a fresh
    /// write for that file or a deletion from the project. Safe to call
    /// on a file with no existing rows.
    async fn delete_file(&self, file_path: &str) -> Result<()>;

    /// Brute-force (or index-accelerated, depending on the adapter)
    /// cosine nearest-neighbor search over stored embeddings.
    async fn vector_search(&self, vector: &[f32], k: usize) -> Result<Vec<VectorMatch>>;

    fn get_database(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_roundtrip() {
        for kind in [
            EntityKind::File,
            EntityKind::Function,
            EntityKind::Method,
            EntityKind::Class,
            EntityKind::Interface,
            EntityKind::TypeAlias,
            EntityKind::Variable,
            EntityKind::GhostNode,
        ] {
            assert_eq!(EntityKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn ghost_entity_has_stable_id() {
        let ghost = Entity::ghost("requests", "get");
        assert_eq!(ghost.id, "ghost:requests:get");
        assert_eq!(ghost.kind, EntityKind::GhostNode);
        assert_eq!(ghost.qualified_name, "requests.get");
    }

    #[test]
    fn cozo_batch_groups_rows_by_relation() {
        let mut batch = CozoBatch::new();
        assert!(batch.is_empty());

        let mut row = StoreRow::new();
        row.insert("id".into(), serde_json::json!("fn:a"));
        batch.push("entities", row);

        assert!(!batch.is_empty());
        assert_eq!(batch.relations["entities"].len(), 1);
    }

    #[test]
    fn edge_kind_as_str_matches_relation_names() {
        assert_eq!(EdgeKind::Contains.as_str(), "CONTAINS");
        assert_eq!(EdgeKind::ReferencesExternal.as_str(), "REFERENCES_EXTERNAL");
    }
}
