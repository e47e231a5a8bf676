//! Subscriber port: callers that want to observe ledger appends without
//! coupling to the buffering/flush implementation.

use super::domain::ChangeLedgerEntry;

/// A subscriber notified synchronously on every append. Implementations
/// must return quickly - they run on the append path and block the
/// producer for as long as they take.
pub trait ChangeSubscriber: Send + Sync {
    fn on_change(&self, entry: &ChangeLedgerEntry);
}
