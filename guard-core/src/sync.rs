//! Synchronizer interface
//!
//! A synchronizer is a stateless translation layer between the in-memory
//! ledger and an external store: it reads records newer than a cutoff and
//! appends new ones. It owns no transactions and pushes no notifications —
//! staleness is bounded only by how often the owner pulls.

use crate::types::{Content, Transaction};
use crate::Result;
use async_trait::async_trait;

/// Pull/push adapter for an external transaction store
///
/// Both operations are expected to be issued sequentially by the owner;
/// concurrent overlapping calls against the same external store are not
/// serialized here and must be avoided or locked externally.
#[async_trait]
pub trait Synchronizer<T: Content>: Send + Sync {
    /// Read all externally recorded transactions newer than the cutoff
    ///
    /// Idempotent: repeated calls with the same cutoff and no intervening
    /// write return the same set, in timestamp order.
    async fn read(&self, since_timestamp: i64) -> Result<Vec<Transaction<T>>>;

    /// Append one transaction to the external store
    ///
    /// The store — not the caller — assigns the authoritative timestamp, so
    /// a compromised client cannot forge "older" records to win convergence
    /// races. Returns the record as stored.
    async fn write(&self, transaction: &Transaction<T>) -> Result<Transaction<T>>;

    /// Append a batch of transactions to the external store
    ///
    /// Returns the records as stored, in write order.
    async fn write_batch(&self, transactions: &[Transaction<T>]) -> Result<Vec<Transaction<T>>>;

    /// Backend name, for logging
    fn name(&self) -> &str;
}

/// Outcome of one [`Ledger::synchronize`](crate::Ledger::synchronize) round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Remote transactions merged into the local chain
    pub pulled: usize,

    /// Local transactions pushed to the external store
    pub pushed: usize,
}
