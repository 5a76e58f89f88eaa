//! Core types for the guarded ledger
//!
//! All protected content is plain, structurally-equatable data: the hashing
//! and sync layers only need deterministic bytes out of it. Reference graphs
//! and identity-bearing objects are out of scope.

use crate::hash::{compute_hash, HashAlgorithm};
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Marker trait for protectable content
///
/// Blanket-implemented for every plain value type: `i32` scores, `u64`
/// currency counters, `String` state flags, small serde structs. The bounds
/// guarantee structural equality and a deterministic serialized form.
pub trait Content:
    Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> Content for T where
    T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Immutable timestamped value wrapper
///
/// The timestamp is assigned once — by the owning structure at append time,
/// or by the backing store when a record is synchronized in — and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction<T> {
    /// Creation instant, milliseconds since the Unix epoch
    timestamp: i64,

    /// Protected value
    content: T,
}

impl<T: Content> Transaction<T> {
    /// Wrap content with an explicit timestamp (store-assigned records)
    pub fn new(timestamp: i64, content: T) -> Self {
        Self { timestamp, content }
    }

    /// Wrap content stamped with the current instant
    pub fn stamp_now(content: T) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            content,
        }
    }

    /// Creation timestamp (epoch milliseconds)
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Protected value
    pub fn content(&self) -> &T {
        &self.content
    }

    /// Consume the wrapper and return the value
    pub fn into_content(self) -> T {
        self.content
    }

    /// Canonical bytes of the content, for hashing
    pub fn canonical_bytes(&self) -> Vec<u8> {
        bincode::serialize(&self.content).expect("serialization cannot fail")
    }

    /// Digest of the content under the given algorithm
    ///
    /// Ledger hashing covers content only; timestamps take part in sync
    /// de-duplication, not in block hashes.
    pub fn content_hash(&self, algorithm: HashAlgorithm) -> Vec<u8> {
        compute_hash(algorithm, &self.canonical_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_is_immutable_after_construction() {
        let tx = Transaction::new(1_700_000_000_000, 42i32);
        assert_eq!(tx.timestamp(), 1_700_000_000_000);
        assert_eq!(*tx.content(), 42);
    }

    #[test]
    fn test_stamp_now_uses_current_clock() {
        let before = Utc::now().timestamp_millis();
        let tx = Transaction::stamp_now(7u64);
        let after = Utc::now().timestamp_millis();
        assert!(tx.timestamp() >= before && tx.timestamp() <= after);
    }

    #[test]
    fn test_content_hash_ignores_timestamp() {
        let a = Transaction::new(1, 99i32);
        let b = Transaction::new(2, 99i32);
        assert_eq!(
            a.content_hash(HashAlgorithm::Sha256),
            b.content_hash(HashAlgorithm::Sha256)
        );
    }

    #[test]
    fn test_structural_equality() {
        let a = Transaction::new(5, "flag".to_string());
        let b = Transaction::new(5, "flag".to_string());
        let c = Transaction::new(6, "flag".to_string());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_wire_shape() {
        let tx = Transaction::new(10, 3i32);
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(json, r#"{"timestamp":10,"content":3}"#);
        let back: Transaction<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
    }
}
