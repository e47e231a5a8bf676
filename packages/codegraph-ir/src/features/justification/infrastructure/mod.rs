//! Translates `Justification` values to and from `Store` rows.
//!
//! Only the narrow `codegraph_storage::Justification` shape is
//! persisted; the richer in-memory fields (tags, clarification
//! questions, reasoning) live for the duration of a single indexing
//! run and are not round-tripped through the store.

use codegraph_storage::{CozoBatch, JustificationStatus, Store, StoreParams, StoreRow};

use crate::errors::{CodegraphError, ErrorKind, Result};
use crate::features::justification::domain::Justification;

const RELATION: &str = "justifications";

fn status_str(status: JustificationStatus) -> &'static str {
    match status {
        JustificationStatus::Pending => "pending",
        JustificationStatus::Confirmed => "confirmed",
        JustificationStatus::NeedsClarification => "needs_clarification",
    }
}

fn parse_status(s: &str) -> Result<JustificationStatus> {
    match s {
        "pending" => Ok(JustificationStatus::Pending),
        "confirmed" => Ok(JustificationStatus::Confirmed),
        "needs_clarification" => Ok(JustificationStatus::NeedsClarification),
        other => Err(CodegraphError::new(
            ErrorKind::Integrity,
            format!("unknown justification status in row: {other}"),
        )),
    }
}

fn row_from_storage(row: &codegraph_storage::Justification) -> StoreRow {
    let mut store_row = StoreRow::new();
    store_row.insert("entity_id".into(), serde_json::json!(row.entity_id));
    store_row.insert("purpose".into(), serde_json::json!(row.purpose));
    store_row.insert(
        "business_value".into(),
        row.business_value
            .as_ref()
            .map(|v| serde_json::json!(v))
            .unwrap_or(serde_json::Value::Null),
    );
    store_row.insert("confidence".into(), serde_json::json!(row.confidence));
    store_row.insert("status".into(), serde_json::json!(status_str(row.status)));
    store_row.insert("created_at".into(), serde_json::json!(row.created_at.to_rfc3339()));
    store_row
}

fn field_str(row: &StoreRow, key: &str) -> Result<String> {
    row.get(key)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| CodegraphError::new(ErrorKind::Integrity, format!("missing field `{key}` in justification row")))
}

fn row_to_justification(row: &StoreRow) -> Result<codegraph_storage::Justification> {
    let entity_id = field_str(row, "entity_id")?;
    let purpose = field_str(row, "purpose")?;
    let business_value = row.get("business_value").and_then(|v| v.as_str()).map(String::from);
    let confidence = row
        .get("confidence")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| CodegraphError::new(ErrorKind::Integrity, "missing field `confidence` in justification row"))? as f32;
    let status = parse_status(&field_str(row, "status")?)?;
    let created_at_raw = field_str(row, "created_at")?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_raw)
        .map_err(|e| CodegraphError::new(ErrorKind::Integrity, format!("bad created_at in justification row: {e}")))?
        .with_timezone(&chrono::Utc);

    Ok(codegraph_storage::Justification {
        entity_id,
        purpose,
        business_value,
        confidence,
        status,
        created_at,
    })
}

/// Writes one entity's justification, replacing any prior row for the
/// same entity. The store is expected to upsert on `entity_id`.
pub async fn write_justification(store: &dyn Store, justification: &Justification) -> Result<()> {
    let mut batch = CozoBatch::new();
    batch.push(RELATION, row_from_storage(&justification.to_storage_row()));
    store.write_batch(batch).await.map_err(CodegraphError::from)
}

pub async fn write_many(store: &dyn Store, justifications: &[Justification]) -> Result<()> {
    if justifications.is_empty() {
        return Ok(());
    }
    let mut batch = CozoBatch::new();
    for justification in justifications {
        batch.push(RELATION, row_from_storage(&justification.to_storage_row()));
    }
    store.write_batch(batch).await.map_err(CodegraphError::from)
}

pub async fn read_for_entity(store: &dyn Store, entity_id: &str) -> Result<Option<codegraph_storage::Justification>> {
    let mut params = StoreParams::new();
    params.insert("entity_id".to_string(), serde_json::json!(entity_id));
    let rows = store
        .query(
            "SELECT entity_id, purpose, business_value, confidence, status, created_at FROM justifications WHERE entity_id = :entity_id",
            params,
        )
        .await
        .map_err(CodegraphError::from)?;
    rows.first().map(row_to_justification).transpose()
}

pub async fn needing_clarification(store: &dyn Store) -> Result<Vec<codegraph_storage::Justification>> {
    let rows = store
        .query(
            "SELECT entity_id, purpose, business_value, confidence, status, created_at FROM justifications WHERE status = 'needs_clarification'",
            StoreParams::new(),
        )
        .await
        .map_err(CodegraphError::from)?;
    rows.iter().map(row_to_justification).collect()
}
