//! SQLite-backed `Store` adapter.
//!
//! Entities and edges are kept as ordinary rows; embeddings land in a
//! flat table and `vector_search` does a brute-force cosine scan over
//! it. A real deployment would swap this module for a Datalog store
//! with native vector indexing without touching any caller of `Store`.

use async_trait::async_trait;
use rusqlite::{params_from_iter, Connection, ToSql};
use std::sync::Mutex;

use crate::domain::{CozoBatch, Store, StoreParams, StoreRow, VectorMatch};
use crate::error::{Result, StorageError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entities (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL,
    file_path TEXT,
    start_line INTEGER,
    end_line INTEGER,
    language TEXT,
    signature TEXT,
    visibility TEXT,
    metadata TEXT
);

CREATE TABLE IF NOT EXISTS edges (
    from_id TEXT NOT NULL,
    to_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    metadata TEXT,
    PRIMARY KEY (from_id, to_id, kind)
);

CREATE TABLE IF NOT EXISTS embeddings (
    entity_id TEXT NOT NULL,
    chunk_id TEXT NOT NULL,
    vector BLOB NOT NULL,
    model TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (entity_id, chunk_id)
);

CREATE TABLE IF NOT EXISTS justifications (
    entity_id TEXT PRIMARY KEY,
    purpose TEXT NOT NULL,
    business_value TEXT,
    confidence REAL NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS change_ledger (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    file_path TEXT NOT NULL,
    change_kind TEXT NOT NULL,
    content_hash TEXT,
    timestamp TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS files (
    id TEXT PRIMARY KEY,
    relative_path TEXT NOT NULL,
    hash TEXT NOT NULL,
    byte_size INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entities_file_path ON entities (file_path);
CREATE INDEX IF NOT EXISTS idx_edges_from_id ON edges (from_id);
CREATE INDEX IF NOT EXISTS idx_edges_to_id ON edges (to_id);
"#;

/// A `Store` implementation over an on-disk or in-memory SQLite file.
/// The connection is serialized behind a mutex: every caller already
/// goes through `async fn`, so the one-writer-at-a-time rule costs
/// nothing beyond blocking on contention.
pub struct SqliteStore {
    database: String,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(database: &str) -> Result<Self> {
        let conn = Connection::open(database)?;
        Ok(Self {
            database: database.to_string(),
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            database: ":memory:".to_string(),
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn insert_entity(conn: &Connection, row: &StoreRow) -> Result<()> {
        conn.execute(
            "INSERT INTO entities (id, kind, name, qualified_name, file_path, start_line, end_line, language, signature, visibility, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind, name = excluded.name, qualified_name = excluded.qualified_name,
                file_path = excluded.file_path, start_line = excluded.start_line, end_line = excluded.end_line,
                language = excluded.language, signature = excluded.signature, visibility = excluded.visibility,
                metadata = excluded.metadata",
            rusqlite::params![
                field_str(row, "id")?,
                field_str(row, "kind")?,
                field_str(row, "name")?,
                field_str(row, "qualified_name")?,
                field_opt_str(row, "file_path"),
                field_opt_i64(row, "start_line"),
                field_opt_i64(row, "end_line"),
                field_opt_str(row, "language"),
                field_opt_str(row, "signature"),
                field_opt_str(row, "visibility"),
                field_json_text(row, "metadata"),
            ],
        )?;
        Ok(())
    }

    fn insert_edge(conn: &Connection, row: &StoreRow) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO edges (from_id, to_id, kind, metadata) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                field_str(row, "from_id")?,
                field_str(row, "to_id")?,
                field_str(row, "kind")?,
                field_json_text(row, "metadata"),
            ],
        )?;
        Ok(())
    }

    fn insert_embedding(conn: &Connection, row: &StoreRow) -> Result<()> {
        let vector: Vec<f32> = row
            .get("vector")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|x| x.as_f64()).map(|x| x as f32).collect())
            .unwrap_or_default();
        conn.execute(
            "INSERT OR REPLACE INTO embeddings (entity_id, chunk_id, vector, model, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                field_str(row, "entity_id")?,
                field_str(row, "chunk_id")?,
                vector_to_blob(&vector),
                field_str(row, "model")?,
                field_str(row, "created_at")?,
            ],
        )?;
        Ok(())
    }

    fn insert_row(conn: &Connection, relation: &str, row: &StoreRow) -> Result<()> {
        match relation {
            "entities" => Self::insert_entity(conn, row),
            "edges" => Self::insert_edge(conn, row),
            "embeddings" => Self::insert_embedding(conn, row),
            "justifications" => Self::insert_justification(conn, row),
            "change_ledger" => Self::insert_change_ledger(conn, row),
            "files" => Self::insert_file(conn, row),
            other => Err(StorageError::missing_relation(other)),
        }
    }

    fn insert_file(conn: &Connection, row: &StoreRow) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO files (id, relative_path, hash, byte_size) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                field_str(row, "id")?,
                field_str(row, "relative_path")?,
                field_str(row, "hash")?,
                field_opt_i64(row, "byte_size").unwrap_or(0),
            ],
        )?;
        Ok(())
    }

    fn insert_justification(conn: &Connection, row: &StoreRow) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO justifications (entity_id, purpose, business_value, confidence, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                field_str(row, "entity_id")?,
                field_str(row, "purpose")?,
                field_opt_str(row, "business_value"),
                row.get("confidence").and_then(|v| v.as_f64()).ok_or_else(|| StorageError::serialization("missing required field: confidence"))?,
                field_str(row, "status")?,
                field_str(row, "created_at")?,
            ],
        )?;
        Ok(())
    }

    fn insert_change_ledger(conn: &Connection, row: &StoreRow) -> Result<()> {
        conn.execute(
            "INSERT INTO change_ledger (file_path, change_kind, content_hash, timestamp) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                field_str(row, "file_path")?,
                field_str(row, "change_kind")?,
                field_opt_str(row, "content_hash"),
                field_str(row, "timestamp")?,
            ],
        )?;
        Ok(())
    }

    /// Delete every entity and edge rooted at a file path, ahead of
    /// re-inserting a fresh extraction for that file.
    pub fn delete_file_rows(conn: &Connection, file_path: &str) -> Result<()> {
        let ids: Vec<String> = {
            let mut stmt = conn.prepare("SELECT id FROM entities WHERE file_path = ?1")?;
            let rows = stmt.query_map([file_path], |r| r.get::<_, String>(0))?;
            rows.collect::<std::result::Result<_, _>>()?
        };
        for id in &ids {
            conn.execute("DELETE FROM edges WHERE from_id = ?1 OR to_id = ?1", [id])?;
            conn.execute("DELETE FROM embeddings WHERE entity_id = ?1", [id])?;
            conn.execute("DELETE FROM justifications WHERE entity_id = ?1", [id])?;
        }
        conn.execute("DELETE FROM entities WHERE file_path = ?1", [file_path])?;
        Ok(())
    }
}

fn field_str(row: &StoreRow, key: &str) -> Result<String> {
    row.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| StorageError::serialization(format!("missing required field: {key}")))
}

fn field_opt_str(row: &StoreRow, key: &str) -> Option<String> {
    row.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn field_opt_i64(row: &StoreRow, key: &str) -> Option<i64> {
    row.get(key).and_then(|v| v.as_i64())
}

fn field_json_text(row: &StoreRow, key: &str) -> String {
    row.get(key).cloned().unwrap_or(serde_json::Value::Null).to_string()
}

fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn blob_to_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn json_to_sql(value: &serde_json::Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as SqlValue;
    match value {
        serde_json::Value::Null => SqlValue::Null,
        serde_json::Value::Bool(b) => SqlValue::Integer(*b as i64),
        serde_json::Value::Number(n) if n.is_i64() => SqlValue::Integer(n.as_i64().unwrap()),
        serde_json::Value::Number(n) => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Converts a bound parameter map into rusqlite's named binding form
/// for scripts that reference `:name` placeholders. Values are always
/// bound, never interpolated into `script`.
fn bind_named(params: &StoreParams) -> Vec<(String, rusqlite::types::Value)> {
    params
        .iter()
        .map(|(k, v)| (format!(":{k}"), json_to_sql(v)))
        .collect()
}

fn as_sql_params(bound: &[(String, rusqlite::types::Value)]) -> Vec<(&str, &dyn ToSql)> {
    bound.iter().map(|(k, v)| (k.as_str(), v as &dyn ToSql)).collect()
}

#[async_trait]
impl Store for SqliteStore {
    async fn initialize(&self) -> Result<()> {
        let conn = self.lock();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn execute(&self, script: &str, params: StoreParams) -> Result<()> {
        let conn = self.lock();
        let bound = bind_named(&params);
        conn.execute(script, &as_sql_params(&bound)[..])?;
        Ok(())
    }

    async fn query(&self, script: &str, params: StoreParams) -> Result<Vec<StoreRow>> {
        let conn = self.lock();
        let bound = bind_named(&params);
        let mut stmt = conn.prepare(script)?;
        let column_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let rows = stmt.query_map(&as_sql_params(&bound)[..], |r| {
            let mut row = StoreRow::new();
            for (idx, name) in column_names.iter().enumerate() {
                let value: serde_json::Value = match r.get_ref(idx)? {
                    rusqlite::types::ValueRef::Null => serde_json::Value::Null,
                    rusqlite::types::ValueRef::Integer(i) => serde_json::json!(i),
                    rusqlite::types::ValueRef::Real(f) => serde_json::json!(f),
                    rusqlite::types::ValueRef::Text(t) => {
                        serde_json::json!(String::from_utf8_lossy(t).to_string())
                    }
                    rusqlite::types::ValueRef::Blob(_) => serde_json::Value::Null,
                };
                row.insert(name.clone(), value);
            }
            Ok(row)
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(StorageError::from)
    }

    async fn write_batch(&self, batch: CozoBatch) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        for (relation, rows) in &batch.relations {
            for row in rows {
                Self::insert_row(&tx, relation, row)?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    async fn delete_file(&self, file_path: &str) -> Result<()> {
        let conn = self.lock();
        Self::delete_file_rows(&conn, file_path)?;
        conn.execute("DELETE FROM files WHERE relative_path = ?1", [file_path])?;
        Ok(())
    }

    async fn vector_search(&self, vector: &[f32], k: usize) -> Result<Vec<VectorMatch>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT entity_id, chunk_id, vector FROM embeddings")?;
        let rows = stmt.query_map([], |r| {
            let entity_id: String = r.get(0)?;
            let chunk_id: String = r.get(1)?;
            let blob: Vec<u8> = r.get(2)?;
            Ok((entity_id, chunk_id, blob))
        })?;

        let mut scored: Vec<VectorMatch> = Vec::new();
        for row in rows {
            let (entity_id, chunk_id, blob) = row?;
            let candidate = blob_to_vector(&blob);
            let score = cosine_similarity(vector, &candidate);
            scored.push(VectorMatch { entity_id, chunk_id, score });
        }

        if scored.is_empty() {
            return Err(StorageError::vector_unavailable("no embeddings stored"));
        }

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    fn get_database(&self) -> &str {
        &self.database
    }
}
