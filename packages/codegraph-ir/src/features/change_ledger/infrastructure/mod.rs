//! Translates `ChangeLedgerEntry` values to and from `Store` rows.
//!
//! The relation name ("change_ledger") and column set mirror the
//! `SqliteStore` schema in `codegraph-storage`; any other `Store`
//! adapter is expected to honor the same relation name.

use codegraph_storage::{ChangeKind, ChangeLedgerEntry, CozoBatch, Store, StoreParams, StoreRow};

use crate::errors::{CodegraphError, ErrorKind, Result};

const RELATION: &str = "change_ledger";

pub fn change_kind_str(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Added => "added",
        ChangeKind::Modified => "modified",
        ChangeKind::Deleted => "deleted",
    }
}

fn parse_change_kind(s: &str) -> Result<ChangeKind> {
    match s {
        "added" => Ok(ChangeKind::Added),
        "modified" => Ok(ChangeKind::Modified),
        "deleted" => Ok(ChangeKind::Deleted),
        other => Err(CodegraphError::new(
            ErrorKind::Integrity,
            format!("unknown change_kind in ledger row: {other}"),
        )),
    }
}

fn entry_to_row(entry: &ChangeLedgerEntry) -> StoreRow {
    let mut row = StoreRow::new();
    row.insert("file_path".into(), serde_json::json!(entry.file_path));
    row.insert(
        "change_kind".into(),
        serde_json::json!(change_kind_str(entry.change_kind)),
    );
    row.insert(
        "content_hash".into(),
        entry
            .content_hash
            .as_ref()
            .map(|h| serde_json::json!(h))
            .unwrap_or(serde_json::Value::Null),
    );
    row.insert(
        "timestamp".into(),
        serde_json::json!(entry.timestamp.to_rfc3339()),
    );
    row
}

/// Writes a batch of entries through `Store::write_batch`.
pub async fn write_entries(store: &dyn Store, entries: &[ChangeLedgerEntry]) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let mut batch = CozoBatch::new();
    for entry in entries {
        batch.push(RELATION, entry_to_row(entry));
    }
    store.write_batch(batch).await.map_err(CodegraphError::from)
}

/// Deletes entries older than `retention_days`, returning how many were removed.
pub async fn prune_expired(store: &dyn Store, retention_days: u32) -> Result<usize> {
    let cutoff = chrono::Utc::now() - chrono::Duration::days(retention_days as i64);
    let mut params = StoreParams::new();
    params.insert("cutoff".to_string(), serde_json::json!(cutoff.to_rfc3339()));

    let pending = store
        .query(
            "SELECT seq FROM change_ledger WHERE timestamp < :cutoff",
            params.clone(),
        )
        .await
        .map_err(CodegraphError::from)?;

    store
        .execute("DELETE FROM change_ledger WHERE timestamp < :cutoff", params)
        .await
        .map_err(CodegraphError::from)?;

    Ok(pending.len())
}

/// Lists entries recorded after `since_seq` (exclusive), ordered oldest first.
pub async fn entries_since(store: &dyn Store, since_seq: i64) -> Result<Vec<ChangeLedgerEntry>> {
    let mut params = StoreParams::new();
    params.insert("since".to_string(), serde_json::json!(since_seq));

    let rows = store
        .query(
            "SELECT seq, file_path, change_kind, content_hash, timestamp FROM change_ledger WHERE seq > :since ORDER BY seq ASC",
            params,
        )
        .await
        .map_err(CodegraphError::from)?;

    rows.iter().map(row_to_entry).collect()
}

fn row_to_entry(row: &codegraph_storage::StoreRow) -> Result<ChangeLedgerEntry> {
    let seq = row.get("seq").and_then(|v| v.as_i64());
    let file_path = row
        .get("file_path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CodegraphError::new(ErrorKind::Integrity, "ledger row missing file_path"))?
        .to_string();
    let change_kind = parse_change_kind(
        row.get("change_kind")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CodegraphError::new(ErrorKind::Integrity, "ledger row missing change_kind"))?,
    )?;
    let content_hash = row.get("content_hash").and_then(|v| v.as_str()).map(String::from);
    let timestamp_str = row
        .get("timestamp")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CodegraphError::new(ErrorKind::Integrity, "ledger row missing timestamp"))?;
    let timestamp = chrono::DateTime::parse_from_rfc3339(timestamp_str)
        .map_err(|e| CodegraphError::new(ErrorKind::Integrity, format!("bad ledger timestamp: {e}")))?
        .with_timezone(&chrono::Utc);

    Ok(ChangeLedgerEntry {
        seq,
        file_path,
        change_kind,
        content_hash,
        timestamp,
    })
}
