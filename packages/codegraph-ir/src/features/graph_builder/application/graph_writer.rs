//! Graph Writer: converts one file's `ExtractionResult` into store rows
//! and commits it with delete-then-insert semantics, so re-indexing a
//! changed file never leaves stale entities or edges behind.

use codegraph_storage::{CozoBatch, Store, StoreRow};

use crate::errors::{CodegraphError, Result};
use crate::features::parsing::ExtractionResult;
use crate::features::scanning::FileInfo;
use crate::shared::models::{Edge, Node};

const VISIBILITY_MODIFIERS: [&str; 3] = ["public", "private", "protected"];

fn entity_row(node: &Node) -> StoreRow {
    let mut row = StoreRow::new();
    row.insert("id".into(), serde_json::json!(node.id));
    row.insert("kind".into(), serde_json::json!(node.kind.as_str()));
    row.insert(
        "name".into(),
        serde_json::json!(node.name.clone().unwrap_or_else(|| node.fqn.clone())),
    );
    row.insert("qualified_name".into(), serde_json::json!(node.fqn));
    row.insert("file_path".into(), serde_json::json!(node.file_path));
    row.insert("start_line".into(), serde_json::json!(node.span.start_line));
    row.insert("end_line".into(), serde_json::json!(node.span.end_line));
    row.insert("language".into(), serde_json::json!(node.language));
    row.insert("signature".into(), signature(node));
    row.insert("visibility".into(), visibility(node));
    row.insert(
        "metadata".into(),
        node.metadata
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or(serde_json::Value::Null),
    );
    row
}

fn signature(node: &Node) -> serde_json::Value {
    match (&node.parameters, &node.return_type) {
        (Some(params), ret) => {
            let params = params.join(", ");
            match ret {
                Some(ret) => serde_json::json!(format!("({params}) -> {ret}")),
                None => serde_json::json!(format!("({params})")),
            }
        }
        (None, _) => serde_json::Value::Null,
    }
}

fn visibility(node: &Node) -> serde_json::Value {
    node.modifiers
        .as_ref()
        .and_then(|mods| mods.iter().find(|m| VISIBILITY_MODIFIERS.contains(&m.as_str())))
        .map(|m| serde_json::json!(m))
        .unwrap_or(serde_json::Value::Null)
}

fn edge_row(edge: &Edge) -> StoreRow {
    let mut row = StoreRow::new();
    row.insert("from_id".into(), serde_json::json!(edge.source_id));
    row.insert("to_id".into(), serde_json::json!(edge.target_id));
    row.insert("kind".into(), serde_json::json!(edge.kind.as_str()));
    row.insert(
        "metadata".into(),
        edge.metadata
            .as_ref()
            .and_then(|m| serde_json::to_value(m).ok())
            .unwrap_or(serde_json::Value::Null),
    );
    row
}

fn file_row(file: &FileInfo) -> StoreRow {
    let mut row = StoreRow::new();
    row.insert("id".into(), serde_json::json!(file.id));
    row.insert("relative_path".into(), serde_json::json!(file.relative_path));
    row.insert("hash".into(), serde_json::json!(file.hash));
    row.insert("byte_size".into(), serde_json::json!(file.byte_size));
    row
}

/// Deletes any prior entities/edges/embeddings/justifications rooted at
/// `file.relative_path`, then writes the extraction's nodes and edges
/// plus the file's content hash in one batch. The delete runs first so
/// a partial failure on write never leaves the old and new rows mixed.
pub async fn write_file_extraction(
    store: &dyn Store,
    file: &FileInfo,
    extraction: &ExtractionResult,
) -> Result<()> {
    store.delete_file(&file.relative_path).await.map_err(CodegraphError::from)?;

    if extraction.nodes.is_empty() && extraction.edges.is_empty() {
        let mut batch = CozoBatch::new();
        batch.push("files", file_row(file));
        return store.write_batch(batch).await.map_err(CodegraphError::from);
    }

    let mut batch = CozoBatch::new();
    for node in &extraction.nodes {
        batch.push("entities", entity_row(node));
    }
    for edge in &extraction.edges {
        batch.push("edges", edge_row(edge));
    }
    batch.push("files", file_row(file));

    store.write_batch(batch).await.map_err(CodegraphError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::{create_full_registry, extract_file};
    use crate::features::scanning::FileInfo;
    use codegraph_storage::SqliteStore;
    use std::sync::Arc;

    async fn open_store() -> Arc<dyn Store> {
        let store = SqliteStore::open_in_memory().expect("open in-memory store");
        store.initialize().await.expect("initialize schema");
        Arc::new(store)
    }

    fn sample_file(relative_path: &str, hash: &str) -> FileInfo {
        FileInfo::new(relative_path.to_string(), relative_path.to_string(), hash.to_string(), 0)
    }

    #[tokio::test]
    async fn writes_extracted_entities_and_edges() {
        let store = open_store().await;
        let registry = create_full_registry();
        let source = "def greet():\n    pass\n";
        let extraction = extract_file(&registry, "repo", "greet.py", source).unwrap();

        write_file_extraction(store.as_ref(), &sample_file("greet.py", "h1"), &extraction)
            .await
            .unwrap();

        let rows = store
            .query("SELECT id FROM entities", codegraph_storage::StoreParams::new())
            .await
            .unwrap();
        assert!(!rows.is_empty());

        let files = store
            .query("SELECT hash FROM files WHERE relative_path = 'greet.py'", codegraph_storage::StoreParams::new())
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn rewriting_a_file_replaces_its_old_entities() {
        let store = open_store().await;
        let registry = create_full_registry();

        let first = extract_file(&registry, "repo", "a.py", "def one():\n    pass\n").unwrap();
        write_file_extraction(store.as_ref(), &sample_file("a.py", "h1"), &first).await.unwrap();
        let first_count = store
            .query("SELECT id FROM entities", codegraph_storage::StoreParams::new())
            .await
            .unwrap()
            .len();
        assert!(first_count > 0);

        let second = extract_file(&registry, "repo", "a.py", "def one():\n    pass\n\ndef two():\n    pass\n").unwrap();
        write_file_extraction(store.as_ref(), &sample_file("a.py", "h2"), &second).await.unwrap();

        let rows = store
            .query("SELECT qualified_name FROM entities", codegraph_storage::StoreParams::new())
            .await
            .unwrap();
        let names: Vec<_> = rows
            .iter()
            .filter_map(|r| r.get("qualified_name").and_then(|v| v.as_str()))
            .collect();
        assert!(names.iter().any(|n| n.contains("two")));

        let hash_rows = store
            .query("SELECT hash FROM files WHERE relative_path = 'a.py'", codegraph_storage::StoreParams::new())
            .await
            .unwrap();
        assert_eq!(hash_rows[0].get("hash").and_then(|v| v.as_str()), Some("h2"));
    }
}
