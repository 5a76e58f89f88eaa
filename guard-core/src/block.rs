//! Capacity-bounded transaction blocks
//!
//! A block is the unit of hash sealing inside the ledger: a fixed-capacity
//! ordered group of transactions plus a stored digest over their contents.
//! A block is "open" while it has room and "closed" once full; closed blocks
//! never receive further appends through the API.

use crate::hash::{compare_hashes, fold_hash, HashAlgorithm};
use crate::types::{Content, Transaction};

/// Fixed-capacity ordered group of transactions with a content hash
#[derive(Debug, Clone)]
pub struct Block<T: Content> {
    capacity: usize,
    items: Vec<Transaction<T>>,
    sealed_hash: Vec<u8>,
    algorithm: HashAlgorithm,
}

impl<T: Content> Block<T> {
    /// Create an empty open block
    pub fn new(capacity: usize, algorithm: HashAlgorithm) -> Self {
        let mut block = Self {
            capacity,
            items: Vec::with_capacity(capacity),
            sealed_hash: Vec::new(),
            algorithm,
        };
        block.sealed_hash = block.compute_hash();
        block
    }

    /// Append a transaction, refreshing the stored hash
    ///
    /// Returns `false` without mutation when the block is already full; the
    /// caller is responsible for rolling to a new block.
    pub fn try_append(&mut self, transaction: Transaction<T>) -> bool {
        if self.items.len() == self.capacity {
            return false;
        }

        self.items.push(transaction);
        self.sealed_hash = self.compute_hash();
        true
    }

    /// Deterministic fold over the item contents, in order
    pub fn compute_hash(&self) -> Vec<u8> {
        let chunks: Vec<Vec<u8>> = self
            .items
            .iter()
            .map(|item| item.content_hash(self.algorithm))
            .collect();
        fold_hash(self.algorithm, chunks.iter().map(|c| c.as_slice()))
    }

    /// Recompute and compare against the stored hash
    ///
    /// A mismatch is a boolean signal, never an error: verification is
    /// expected to fail under attack and must not unwind the call stack.
    pub fn verify(&self) -> bool {
        compare_hashes(&self.sealed_hash, &self.compute_hash())
    }

    /// Stored hash as sealed at the last guarded append
    pub fn sealed_hash(&self) -> &[u8] {
        &self.sealed_hash
    }

    /// Whether the block reached its capacity
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Number of transactions in the block
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the block is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fixed capacity chosen at creation
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Transactions in append order
    pub fn items(&self) -> &[Transaction<T>] {
        &self.items
    }

    /// Raw access to the backing storage, bypassing the guarded API
    ///
    /// Exists so test doubles can simulate external tampering. Mutations
    /// through this accessor are exactly what the integrity checks catch.
    #[doc(hidden)]
    pub fn items_mut_unchecked(&mut self) -> &mut Vec<Transaction<T>> {
        &mut self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_of(values: &[i32], capacity: usize) -> Block<i32> {
        let mut block = Block::new(capacity, HashAlgorithm::Sha256);
        for (i, v) in values.iter().enumerate() {
            assert!(block.try_append(Transaction::new(i as i64, *v)));
        }
        block
    }

    #[test]
    fn test_append_until_full() {
        let mut block = block_of(&[1, 2], 2);
        assert!(block.is_full());
        assert!(!block.try_append(Transaction::new(9, 3)));
        assert_eq!(block.len(), 2);
    }

    #[test]
    fn test_rejected_append_leaves_hash_intact() {
        let mut block = block_of(&[1, 2], 2);
        let sealed = block.sealed_hash().to_vec();
        block.try_append(Transaction::new(9, 3));
        assert_eq!(block.sealed_hash(), sealed.as_slice());
        assert!(block.verify());
    }

    #[test]
    fn test_hash_deterministic_across_instances() {
        let a = block_of(&[5, 6, 7], 4);
        let b = block_of(&[5, 6, 7], 4);
        assert_eq!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn test_hash_depends_on_order() {
        let a = block_of(&[5, 6], 2);
        let b = block_of(&[6, 5], 2);
        assert_ne!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn test_verify_detects_raw_mutation() {
        let mut block = block_of(&[1, 2, 3], 3);
        assert!(block.verify());

        block.items_mut_unchecked()[0] = Transaction::new(0, 42);
        assert!(!block.verify());
    }

    #[test]
    fn test_empty_block_verifies() {
        let block: Block<i32> = Block::new(3, HashAlgorithm::Sha512);
        assert!(block.verify());
        assert!(block.is_empty());
    }
}
