//! Tamper-evident block chain ledger
//!
//! The ledger is an ordered sequence of capacity-bounded, hash-sealed
//! blocks. Only the tail block is mutable; every guarded mutation verifies
//! the tail hash first, and any mismatch permanently marks the whole
//! structure compromised. Verification comes in two tiers: a cheap tail-only
//! check paid on every append, and a full-chain walk for periodic audits.
//!
//! # Example
//!
//! ```
//! use guard_core::Ledger;
//!
//! let mut ledger: Ledger<i32> = Ledger::new(2).unwrap();
//! assert!(ledger.append(1500));
//! assert!(ledger.append(1800));
//! assert!(ledger.append(2100)); // rolls into a second block
//! assert_eq!(ledger.block_count(), 2);
//! assert!(ledger.check_integrity());
//! ```

use crate::block::Block;
use crate::hash::HashAlgorithm;
use crate::monitor::{Breach, IntegrityObserver, StructureKind};
use crate::sync::{SyncReport, Synchronizer};
use crate::types::{Content, Transaction};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Ordered sequence of hash-sealed blocks with guarded appends
pub struct Ledger<T: Content> {
    blocks: Vec<Block<T>>,
    capacity: usize,
    algorithm: HashAlgorithm,
    has_integrity: bool,
    label: String,
    observer: Option<Arc<dyn IntegrityObserver>>,
    synchronizer: Option<Arc<dyn Synchronizer<T>>>,
    pending_push: Vec<Transaction<T>>,
    last_sync_timestamp: i64,
}

impl<T: Content> Ledger<T> {
    /// Create an empty healthy ledger
    ///
    /// `capacity` is the fixed block size and must be at least 1; a capacity
    /// of 1 degenerates to one transaction per block (maximal audit
    /// granularity, maximal memory overhead).
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::Config("block capacity must be at least 1".into()));
        }

        let algorithm = HashAlgorithm::default();
        Ok(Self {
            blocks: vec![Block::new(capacity, algorithm)],
            capacity,
            algorithm,
            has_integrity: true,
            label: "ledger".to_string(),
            observer: None,
            synchronizer: None,
            pending_push: Vec::new(),
            last_sync_timestamp: 0,
        })
    }

    /// Select the digest algorithm
    ///
    /// Only honored before the first append: a mid-stream swap would seal
    /// later blocks under a different algorithm than earlier ones, so the
    /// call is ignored once transactions exist.
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        if self.transaction_count() == 0 {
            self.algorithm = algorithm;
            self.blocks = vec![Block::new(self.capacity, algorithm)];
        }
        self
    }

    /// Attach an instance label used in breach notifications
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Inject the integrity observer notified on compromise
    pub fn with_observer(mut self, observer: Arc<dyn IntegrityObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Bind a synchronizer for pull/push reconciliation
    pub fn with_synchronizer(mut self, synchronizer: Arc<dyn Synchronizer<T>>) -> Self {
        self.synchronizer = Some(synchronizer);
        self
    }

    /// Guarded append
    ///
    /// Verifies the tail block hash first (O(capacity)); rolls to a fresh
    /// block when the tail is full; stamps and stores the value. Returns
    /// `false` without mutation once the ledger is compromised, or when this
    /// call is the one that detects the compromise.
    pub fn append(&mut self, value: T) -> bool {
        if !self.has_integrity {
            return false;
        }

        if !self.tail().verify() {
            self.mark_compromised("tail block hash mismatch on append");
            return false;
        }

        self.commit(value);
        true
    }

    /// Guarded append with the tail verification offloaded
    ///
    /// Same contract as [`append`](Self::append); the O(capacity) hash
    /// recomputation runs on a blocking worker over a snapshot of the tail.
    /// A failed join behaves as if the append was never attempted.
    pub async fn append_async(&mut self, value: T) -> bool {
        if !self.has_integrity {
            return false;
        }

        let snapshot = self.tail().clone();
        let verified = match tokio::task::spawn_blocking(move || snapshot.verify()).await {
            Ok(verified) => verified,
            Err(_) => return false,
        };

        if !verified {
            self.mark_compromised("tail block hash mismatch on append");
            return false;
        }

        self.commit(value);
        true
    }

    /// Cheap tail-only verification, intended for per-append cost
    ///
    /// Marks the ledger compromised on mismatch. Note the deliberate
    /// trade-off: tampering inside an already closed block is invisible
    /// here and only surfaces in [`check_integrity`](Self::check_integrity).
    pub fn check_integrity_of_last_block(&mut self) -> bool {
        if !self.has_integrity {
            return false;
        }

        if !self.tail().verify() {
            self.mark_compromised("tail block hash mismatch");
            return false;
        }
        true
    }

    /// Full O(n) walk verifying every block's stored hash
    ///
    /// Intended for periodic or on-demand deep audits, not per-append.
    pub fn check_integrity(&mut self) -> bool {
        if !self.has_integrity {
            return false;
        }

        for (index, block) in self.blocks.iter().enumerate() {
            if !block.verify() {
                self.mark_compromised(format!("block {} hash mismatch", index));
                return false;
            }
        }
        true
    }

    /// Reconcile against the bound synchronizer
    ///
    /// Pulls records newer than the last sync cutoff and merges them without
    /// duplication (timestamp+content), preserving store-assigned
    /// timestamps; then pushes locally appended transactions and re-reads
    /// once to advance the cutoff past their stored timestamps, whether or
    /// not the store echoes them. Transport failures propagate to the
    /// caller; a compromised ledger synchronizes nothing.
    pub async fn synchronize(&mut self) -> Result<SyncReport> {
        let synchronizer = self
            .synchronizer
            .clone()
            .ok_or_else(|| Error::Config("no synchronizer bound".to_string()))?;

        if !self.has_integrity {
            debug!(label = %self.label, "skipping synchronization of compromised ledger");
            return Ok(SyncReport::default());
        }

        let mut report = SyncReport::default();

        let remote = synchronizer.read(self.last_sync_timestamp).await?;
        for transaction in remote {
            self.last_sync_timestamp = self.last_sync_timestamp.max(transaction.timestamp());
            if !self.contains(&transaction) {
                self.push_transaction(transaction);
                report.pulled += 1;
            }
        }

        if !self.pending_push.is_empty() {
            let stored = synchronizer.write_batch(&self.pending_push).await?;
            for transaction in &stored {
                self.last_sync_timestamp = self.last_sync_timestamp.max(transaction.timestamp());
            }
            report.pushed = self.pending_push.len();
            let mut unconfirmed: Vec<T> = std::mem::take(&mut self.pending_push)
                .into_iter()
                .map(Transaction::into_content)
                .collect();

            // A store that does not echo its assigned timestamps hands the
            // records back under the client's local stamps, leaving the
            // cutoff short of the stored records; the next pull would then
            // return our own pushes as foreign and the timestamp+content
            // de-dup could not match them. Read once more and consume one
            // returned record per pushed content before merging.
            let confirmation = synchronizer.read(self.last_sync_timestamp).await?;
            for transaction in confirmation {
                self.last_sync_timestamp = self.last_sync_timestamp.max(transaction.timestamp());
                if let Some(index) = unconfirmed
                    .iter()
                    .position(|content| content == transaction.content())
                {
                    unconfirmed.remove(index);
                } else if !self.contains(&transaction) {
                    self.push_transaction(transaction);
                    report.pulled += 1;
                }
            }
        }

        info!(
            backend = synchronizer.name(),
            label = %self.label,
            pulled = report.pulled,
            pushed = report.pushed,
            "ledger synchronized"
        );
        Ok(report)
    }

    /// Whether the ledger is still healthy
    ///
    /// Monotonic: once `false`, never `true` again. The only way to resume
    /// writing is to construct a fresh ledger.
    pub fn has_integrity(&self) -> bool {
        self.has_integrity
    }

    /// Number of blocks, including the open tail
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total number of stored transactions
    pub fn transaction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.len()).sum()
    }

    /// Blocks in chain order
    pub fn blocks(&self) -> &[Block<T>] {
        &self.blocks
    }

    /// Timestamp cutoff of the last synchronization
    pub fn last_sync_timestamp(&self) -> i64 {
        self.last_sync_timestamp
    }

    /// Raw access to a block, bypassing the guarded API
    ///
    /// Exists so test doubles can simulate external tampering.
    #[doc(hidden)]
    pub fn block_mut_unchecked(&mut self, index: usize) -> Option<&mut Block<T>> {
        self.blocks.get_mut(index)
    }

    /// Stamp, store and (when a synchronizer is bound) queue for push
    fn commit(&mut self, value: T) {
        let transaction = Transaction::stamp_now(value);
        if self.synchronizer.is_some() {
            self.pending_push.push(transaction.clone());
        }
        self.push_transaction(transaction);
    }

    /// Append a ready transaction, rolling to a new block when needed
    fn push_transaction(&mut self, transaction: Transaction<T>) {
        if self.tail().is_full() {
            self.blocks.push(Block::new(self.capacity, self.algorithm));
        }
        let appended = self.tail_mut().try_append(transaction);
        debug_assert!(appended, "fresh tail block rejected an append");
    }

    /// De-duplication probe over (timestamp, content)
    fn contains(&self, transaction: &Transaction<T>) -> bool {
        self.blocks
            .iter()
            .any(|block| block.items().iter().any(|item| item == transaction))
    }

    fn tail(&self) -> &Block<T> {
        self.blocks.last().expect("ledger always has a tail block")
    }

    fn tail_mut(&mut self) -> &mut Block<T> {
        self.blocks
            .last_mut()
            .expect("ledger always has a tail block")
    }

    fn mark_compromised(&mut self, detail: impl Into<String>) {
        self.has_integrity = false;
        let breach = Breach::new(StructureKind::Ledger, &self.label, detail);
        if let Some(observer) = &self.observer {
            observer.on_breach(&breach);
        }
    }
}

impl<T: Content> std::fmt::Debug for Ledger<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("label", &self.label)
            .field("capacity", &self.capacity)
            .field("algorithm", &self.algorithm)
            .field("blocks", &self.blocks.len())
            .field("transactions", &self.transaction_count())
            .field("has_integrity", &self.has_integrity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recording {
        breaches: AtomicUsize,
    }

    impl IntegrityObserver for Recording {
        fn on_breach(&self, _breach: &Breach) {
            self.breaches.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_capacity_zero_rejected() {
        assert!(matches!(Ledger::<i32>::new(0), Err(Error::Config(_))));
    }

    #[test]
    fn test_block_rollover() {
        let mut ledger: Ledger<i32> = Ledger::new(3).unwrap();
        for v in 0..4 {
            assert!(ledger.append(v));
        }
        assert_eq!(ledger.block_count(), 2);
        assert_eq!(ledger.blocks()[0].len(), 3);
        assert_eq!(ledger.blocks()[1].len(), 1);
    }

    #[test]
    fn test_two_tier_verification() {
        // Capacity 2, append 1..=5 -> blocks [1,2] [3,4] [5]
        let mut ledger: Ledger<i32> = Ledger::new(2).unwrap();
        for v in 1..=5 {
            assert!(ledger.append(v));
        }
        assert_eq!(ledger.block_count(), 3);
        assert!(ledger.check_integrity_of_last_block());
        assert!(ledger.check_integrity());

        // Tamper with the first (closed) block
        ledger.block_mut_unchecked(0).unwrap().items_mut_unchecked()[0] =
            Transaction::new(0, 42);

        // Tail untouched: the cheap check still passes
        assert!(ledger.check_integrity_of_last_block());
        // The full walk reports the tamper
        assert!(!ledger.check_integrity());
        // And further appends are rejected, fail-closed
        assert!(!ledger.append(6));
    }

    #[test]
    fn test_compromise_is_monotonic() {
        let mut ledger: Ledger<i32> = Ledger::new(2).unwrap();
        ledger.append(1);
        ledger.block_mut_unchecked(0).unwrap().items_mut_unchecked()[0] =
            Transaction::new(0, 9);

        assert!(!ledger.check_integrity());
        for _ in 0..3 {
            assert!(!ledger.check_integrity());
            assert!(!ledger.check_integrity_of_last_block());
            assert!(!ledger.append(10));
        }
        assert!(!ledger.has_integrity());
    }

    #[test]
    fn test_rejected_append_leaves_content_unchanged() {
        let mut ledger: Ledger<i32> = Ledger::new(2).unwrap();
        ledger.append(1);
        ledger.block_mut_unchecked(0).unwrap().items_mut_unchecked()[0] =
            Transaction::new(0, 9);
        ledger.check_integrity();

        let before = ledger.transaction_count();
        assert!(!ledger.append(2));
        assert_eq!(ledger.transaction_count(), before);
    }

    #[test]
    fn test_tamper_on_tail_detected_by_next_append() {
        let observer = Arc::new(Recording::default());
        let mut ledger: Ledger<i32> = Ledger::new(4)
            .unwrap()
            .with_label("wallet")
            .with_observer(observer.clone());

        ledger.append(100);
        ledger.block_mut_unchecked(0).unwrap().items_mut_unchecked()[0] =
            Transaction::new(0, 100_000);

        assert!(!ledger.append(200));
        assert!(!ledger.has_integrity());
        assert_eq!(observer.breaches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_observer_notified_once() {
        let observer = Arc::new(Recording::default());
        let mut ledger: Ledger<i32> = Ledger::new(2)
            .unwrap()
            .with_observer(observer.clone());

        ledger.append(1);
        ledger.block_mut_unchecked(0).unwrap().items_mut_unchecked()[0] =
            Transaction::new(0, 9);

        assert!(!ledger.check_integrity());
        assert!(!ledger.check_integrity());
        assert!(!ledger.append(2));
        assert_eq!(observer.breaches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_capacity_one_degenerates_to_block_per_transaction() {
        let mut ledger: Ledger<u64> = Ledger::new(1).unwrap();
        for v in 0..3 {
            assert!(ledger.append(v));
        }
        assert_eq!(ledger.block_count(), 3);
        assert!(ledger.blocks().iter().all(|b| b.len() == 1));
    }

    #[test]
    fn test_with_algorithm_is_ignored_once_transactions_exist() {
        let ledger: Ledger<i32> = Ledger::new(1).unwrap();
        let mut ledger = ledger.with_algorithm(HashAlgorithm::Md5);
        assert!(ledger.append(1));

        let mut ledger = ledger.with_algorithm(HashAlgorithm::Sha512);
        assert!(ledger.append(2));

        // Both blocks stay sealed under MD5 (16-byte digests)
        assert!(ledger.blocks().iter().all(|b| b.sealed_hash().len() == 16));
        assert!(ledger.check_integrity());
    }

    #[tokio::test]
    async fn test_append_async_matches_sync_contract() {
        let mut ledger: Ledger<i32> = Ledger::new(2).unwrap();
        assert!(ledger.append_async(1).await);
        assert!(ledger.append_async(2).await);
        assert!(ledger.append_async(3).await);
        assert_eq!(ledger.block_count(), 2);
        assert!(ledger.check_integrity());
    }

    #[tokio::test]
    async fn test_append_async_detects_tamper() {
        let mut ledger: Ledger<i32> = Ledger::new(4).unwrap();
        ledger.append(1);
        ledger.block_mut_unchecked(0).unwrap().items_mut_unchecked()[0] =
            Transaction::new(0, 2);

        assert!(!ledger.append_async(3).await);
        assert!(!ledger.has_integrity());
    }

    #[tokio::test]
    async fn test_synchronize_without_backend_is_misuse() {
        let mut ledger: Ledger<i32> = Ledger::new(2).unwrap();
        assert!(matches!(ledger.synchronize().await, Err(Error::Config(_))));
    }
}
