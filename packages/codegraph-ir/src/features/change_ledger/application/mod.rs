//! Buffered append-only ledger: entries accumulate in memory and are
//! flushed to the store in batches, either because a threshold was
//! crossed or because the flush timer fired.
//!
//! An in-memory `VecDeque` log behind a lock, with threshold-triggered
//! compaction, generalized from a transaction write-ahead log to a
//! store-backed change ledger.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use codegraph_storage::{ChangeKind, ChangeLedgerEntry, Store};

use crate::errors::Result;
use crate::features::change_ledger::domain::LedgerConfig;
use crate::features::change_ledger::infrastructure;
use crate::features::change_ledger::ports::ChangeSubscriber;

/// Buffered, store-backed change ledger.
pub struct ChangeLedger {
    store: Arc<dyn Store>,
    config: LedgerConfig,
    buffer: Mutex<VecDeque<ChangeLedgerEntry>>,
    subscribers: RwLock<Vec<Arc<dyn ChangeSubscriber>>>,
}

impl ChangeLedger {
    pub fn new(store: Arc<dyn Store>, config: LedgerConfig) -> Self {
        Self {
            store,
            config,
            buffer: Mutex::new(VecDeque::new()),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, subscriber: Arc<dyn ChangeSubscriber>) {
        self.subscribers.write().push(subscriber);
    }

    /// Records a change. Subscribers are notified synchronously before
    /// the entry is buffered; the store write happens on the next flush.
    pub fn record(&self, file_path: impl Into<String>, change_kind: ChangeKind, content_hash: Option<String>) -> bool {
        let entry = ChangeLedgerEntry {
            seq: None,
            file_path: file_path.into(),
            change_kind,
            content_hash,
            timestamp: chrono::Utc::now(),
        };

        if self.config.enable_subscriptions {
            for subscriber in self.subscribers.read().iter() {
                subscriber.on_change(&entry);
            }
        }

        let mut buffer = self.buffer.lock();
        buffer.push_back(entry);
        buffer.len() >= self.config.max_batch_size || buffer.len() >= self.config.memory_cache_size
    }

    /// Drains the buffer and writes every pending entry to the store.
    pub async fn flush(&self) -> Result<usize> {
        let pending: Vec<ChangeLedgerEntry> = {
            let mut buffer = self.buffer.lock();
            let take = buffer.len().min(self.config.max_batch_size.max(1));
            buffer.drain(..take).collect()
        };
        if pending.is_empty() {
            return Ok(0);
        }
        let count = pending.len();
        infrastructure::write_entries(self.store.as_ref(), &pending).await?;
        Ok(count)
    }

    /// Flushes everything, including entries past a single batch. Called
    /// repeatedly until the buffer is empty.
    pub async fn flush_all(&self) -> Result<usize> {
        let mut total = 0;
        loop {
            let flushed = self.flush().await?;
            if flushed == 0 {
                break;
            }
            total += flushed;
        }
        Ok(total)
    }

    /// Drains the buffer before returning; callers must stop producing
    /// before calling this.
    pub async fn shutdown(&self) -> Result<()> {
        self.flush_all().await?;
        Ok(())
    }

    /// Runs the periodic flush timer until cancelled. Intended to be
    /// spawned as a background task alongside the ledger.
    pub async fn run_flush_timer(self: Arc<Self>, cancel: tokio::sync::watch::Receiver<bool>) {
        let mut cancel = cancel;
        let interval = std::time::Duration::from_millis(self.config.flush_interval_ms.max(1));
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    if let Err(err) = self.flush_all().await {
                        tracing::warn!(error = %err, "change ledger flush failed");
                    }
                }
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        break;
                    }
                }
            }
        }
    }

    pub async fn prune_expired(&self) -> Result<usize> {
        infrastructure::prune_expired(self.store.as_ref(), self.config.retention_days).await
    }

    pub async fn entries_since(&self, since_seq: i64) -> Result<Vec<ChangeLedgerEntry>> {
        infrastructure::entries_since(self.store.as_ref(), since_seq).await
    }

    pub fn pending_len(&self) -> usize {
        self.buffer.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_storage::SqliteStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSubscriber(AtomicUsize);

    impl ChangeSubscriber for CountingSubscriber {
        fn on_change(&self, _entry: &ChangeLedgerEntry) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn store() -> Arc<dyn Store> {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().await.unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn record_then_flush_writes_to_store() {
        let store = store().await;
        let ledger = ChangeLedger::new(store.clone(), LedgerConfig::default());

        ledger.record("src/lib.rs", ChangeKind::Added, Some("abc123".into()));
        ledger.record("src/main.rs", ChangeKind::Modified, None);
        assert_eq!(ledger.pending_len(), 2);

        let flushed = ledger.flush_all().await.unwrap();
        assert_eq!(flushed, 2);
        assert_eq!(ledger.pending_len(), 0);

        let entries = ledger.entries_since(0).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file_path, "src/lib.rs");
        assert_eq!(entries[1].change_kind, ChangeKind::Modified);
    }

    #[tokio::test]
    async fn subscriber_notified_synchronously_on_append() {
        let store = store().await;
        let ledger = ChangeLedger::new(store, LedgerConfig::default());
        let subscriber = Arc::new(CountingSubscriber(AtomicUsize::new(0)));
        ledger.subscribe(subscriber.clone());

        ledger.record("src/lib.rs", ChangeKind::Added, None);

        assert_eq!(subscriber.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn max_batch_size_signals_flush_needed() {
        let store = store().await;
        let config = LedgerConfig {
            max_batch_size: 2,
            ..LedgerConfig::default()
        };
        let ledger = ChangeLedger::new(store, config);

        assert!(!ledger.record("a.rs", ChangeKind::Added, None));
        assert!(ledger.record("b.rs", ChangeKind::Added, None));
    }

    #[tokio::test]
    async fn shutdown_drains_pending_entries() {
        let store = store().await;
        let ledger = ChangeLedger::new(store, LedgerConfig::default());
        ledger.record("a.rs", ChangeKind::Deleted, None);

        ledger.shutdown().await.unwrap();

        assert_eq!(ledger.pending_len(), 0);
        let entries = ledger.entries_since(0).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn prune_expired_removes_old_rows() {
        let store = store().await;
        let ledger = ChangeLedger::new(store, LedgerConfig::default());
        ledger.record("a.rs", ChangeKind::Added, None);
        ledger.flush_all().await.unwrap();

        // Freshly-written entries are within retention, so nothing is pruned.
        let pruned = ledger.prune_expired().await.unwrap();
        assert_eq!(pruned, 0);
    }
}
