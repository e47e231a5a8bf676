//! Change Ledger domain model: the entry type lives on `codegraph_storage`
//! since it is a stored relation; this module adds the buffering policy
//! that governs how entries move from the producer to the store.

pub use codegraph_storage::{ChangeKind, ChangeLedgerEntry};

/// Buffering and retention policy for the ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Max entries held in memory before a flush is forced.
    pub memory_cache_size: usize,
    /// Upper bound on how long an entry waits before being flushed.
    pub flush_interval_ms: u64,
    /// Max entries written to the store in a single batch.
    pub max_batch_size: usize,
    /// Entries older than this are eligible for pruning.
    pub retention_days: u32,
    /// Whether subscribers are notified synchronously on append.
    pub enable_subscriptions: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            memory_cache_size: 1000,
            flush_interval_ms: 500,
            max_batch_size: 200,
            retention_days: 90,
            enable_subscriptions: true,
        }
    }
}

impl LedgerConfig {
    pub fn from_project_config(config: &crate::config::ProjectConfig) -> Self {
        Self {
            retention_days: config.retention_days,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retention_matches_project_default() {
        assert_eq!(LedgerConfig::default().retention_days, 90);
    }
}
