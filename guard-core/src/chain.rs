//! Single-hash tamper-evident value chain
//!
//! `DataChain` trades cost for conceptual simplicity: instead of block-level
//! sealing it keeps one aggregate hash over the entire sequence and
//! recomputes it fully on every mutation. That makes every guarded call
//! O(n) — fine for a short history of critical game-state transitions,
//! unsuitable for large collections.

use crate::hash::{compare_hashes, digest_sequence, HashAlgorithm};
use crate::monitor::{Breach, IntegrityObserver, StructureKind};
use crate::types::Content;
use std::collections::VecDeque;
use std::sync::Arc;

/// Ordered sequence of raw values with a full-sequence aggregate hash
pub struct DataChain<T: Content> {
    chain: VecDeque<T>,
    aggregate_hash: Vec<u8>,
    algorithm: HashAlgorithm,
    has_integrity: bool,
    label: String,
    observer: Option<Arc<dyn IntegrityObserver>>,
}

impl<T: Content> DataChain<T> {
    /// Create an empty healthy chain
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::default())
    }

    /// Create an empty chain hashed with the given algorithm
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        let mut chain = Self {
            chain: VecDeque::new(),
            aggregate_hash: Vec::new(),
            algorithm,
            has_integrity: true,
            label: "data_chain".to_string(),
            observer: None,
        };
        chain.aggregate_hash = chain.compute_aggregate();
        chain
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

    /// Guarded append
    ///
    /// Verifies the aggregate hash, stores the value, rehashes. `false` and
    /// no mutation on a compromised chain or on the call that detects the
    /// compromise.
    pub fn append(&mut self, value: T) -> bool {
        if !self.verify("append") {
            return false;
        }

        self.chain.push_back(value);
        self.aggregate_hash = self.compute_aggregate();
        true
    }

    /// Guarded removal of the most recent value
    pub fn remove_last(&mut self) -> bool {
        if !self.verify("remove_last") {
            return false;
        }

        if self.chain.pop_back().is_none() {
            return false;
        }
        self.aggregate_hash = self.compute_aggregate();
        true
    }

    /// Guarded append with the O(n) recompute offloaded
    ///
    /// The verification runs on a blocking worker over a snapshot; a failed
    /// join behaves as if the append was never attempted.
    pub async fn append_async(&mut self, value: T) -> bool {
        if !self.verify_offloaded().await {
            return false;
        }

        self.chain.push_back(value);
        self.aggregate_hash = self.compute_aggregate();
        true
    }

    /// Guarded removal with the O(n) recompute offloaded
    pub async fn remove_last_async(&mut self) -> bool {
        if !self.verify_offloaded().await {
            return false;
        }

        if self.chain.pop_back().is_none() {
            return false;
        }
        self.aggregate_hash = self.compute_aggregate();
        true
    }

    /// Explicit verification without mutating the sequence
    pub fn check_integrity(&mut self) -> bool {
        self.verify("check_integrity")
    }

    /// Whether the chain is still healthy (monotonic)
    pub fn has_integrity(&self) -> bool {
        self.has_integrity
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Values in append order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.chain.iter()
    }

    /// Raw access to the backing sequence, bypassing the guarded API
    ///
    /// Exists so test doubles can simulate external tampering.
    #[doc(hidden)]
    pub fn chain_mut_unchecked(&mut self) -> &mut VecDeque<T> {
        &mut self.chain
    }

    /// Full recomputation over the entire sequence, in order
    fn compute_aggregate(&self) -> Vec<u8> {
        digest_sequence(self.algorithm, self.chain.iter())
    }

    fn verify(&mut self, operation: &str) -> bool {
        if !self.has_integrity {
            return false;
        }

        if !compare_hashes(&self.aggregate_hash, &self.compute_aggregate()) {
            self.mark_compromised(format!("aggregate hash mismatch on {}", operation));
            return false;
        }
        true
    }

    async fn verify_offloaded(&mut self) -> bool {
        if !self.has_integrity {
            return false;
        }

        let expected = self.aggregate_hash.clone();
        let snapshot: Vec<T> = self.chain.iter().cloned().collect();
        let algorithm = self.algorithm;

        let matches = tokio::task::spawn_blocking(move || {
            compare_hashes(&expected, &digest_sequence(algorithm, snapshot.iter()))
        })
        .await;

        match matches {
            Ok(true) => true,
            Ok(false) => {
                self.mark_compromised("aggregate hash mismatch on async mutation");
                false
            }
            // Join failure: behave as if the operation was never attempted
            Err(_) => false,
        }
    }

    fn mark_compromised(&mut self, detail: impl Into<String>) {
        self.has_integrity = false;
        let breach = Breach::new(StructureKind::DataChain, &self.label, detail);
        if let Some(observer) = &self.observer {
            observer.on_breach(&breach);
        }
    }
}

impl<T: Content> Default for DataChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Content> std::fmt::Debug for DataChain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataChain")
            .field("label", &self.label)
            .field("algorithm", &self.algorithm)
            .field("len", &self.chain.len())
            .field("has_integrity", &self.has_integrity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_remove_last() {
        let mut chain: DataChain<i32> = DataChain::new();
        assert!(chain.append(1));
        assert!(chain.append(2));
        assert!(chain.remove_last());
        assert_eq!(chain.len(), 1);
        assert!(chain.check_integrity());
    }

    #[test]
    fn test_remove_last_on_empty() {
        let mut chain: DataChain<i32> = DataChain::new();
        assert!(!chain.remove_last());
        // Emptiness is not a breach
        assert!(chain.has_integrity());
    }

    #[test]
    fn test_raw_mutation_caught_on_next_guarded_call() {
        let mut chain: DataChain<i32> = DataChain::new();
        chain.append(10);
        chain.append(20);

        chain.chain_mut_unchecked()[1] = 9_999;

        assert!(!chain.append(30));
        assert!(!chain.has_integrity());
        // Fail-closed from here on
        assert!(!chain.append(40));
        assert!(!chain.remove_last());
        assert!(!chain.check_integrity());
    }

    #[test]
    fn test_check_integrity_does_not_mutate() {
        let mut chain: DataChain<String> = DataChain::new();
        chain.append("spawned".to_string());
        chain.append("boss_defeated".to_string());

        assert!(chain.check_integrity());
        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain.iter().cloned().collect::<Vec<_>>(),
            vec!["spawned".to_string(), "boss_defeated".to_string()]
        );
    }

    #[tokio::test]
    async fn test_async_variants_share_the_sync_contract() {
        let mut chain: DataChain<i32> = DataChain::with_algorithm(HashAlgorithm::Sha512);
        assert!(chain.append_async(1).await);
        assert!(chain.append_async(2).await);
        assert!(chain.remove_last_async().await);
        assert_eq!(chain.len(), 1);

        chain.chain_mut_unchecked()[0] = 5;
        assert!(!chain.append_async(3).await);
        assert!(!chain.has_integrity());
    }
}
