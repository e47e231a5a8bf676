//! Change ledger: buffered append-only log of file changes, flushed to
//! the store in batches and pruned on a retention window.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::ChangeLedger;
pub use domain::{ChangeKind, ChangeLedgerEntry, LedgerConfig};
pub use ports::ChangeSubscriber;
