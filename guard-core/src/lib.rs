//! GuardChain Core
//!
//! Tamper-evident, append-only structures for protecting in-memory game
//! data (scores, currency, state flags) from memory editors and save-file
//! tampering.
//!
//! # Architecture
//!
//! - **Ledger**: transactions grouped into capacity-bounded, hash-sealed
//!   blocks; cheap tail-only verification on every append, full-chain walk
//!   for deep audits
//! - **DataChain**: a simpler single-hash sequence, O(n) per mutation
//! - **Guarded containers**: list/queue/stack wrappers with a single stored
//!   hash over a deterministic traversal order
//! - **Synchronizer**: pluggable pull/push reconciliation against a file or
//!   HTTP store (implementations live in `guard-sync`)
//!
//! # Invariants
//!
//! - Monotonic compromise: once a structure loses integrity it never
//!   regains it; every later mutation is a fail-closed no-op
//! - Hash determinism: identical element order yields identical digests
//!   across calls and instances
//! - Append-only: the ledger grows by appends and never shrinks

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    unused_qualifications
)]

pub mod block;
pub mod chain;
pub mod config;
pub mod error;
pub mod guarded;
pub mod hash;
pub mod ledger;
pub mod monitor;
pub mod sync;
pub mod types;

// Re-exports
pub use block::Block;
pub use chain::DataChain;
pub use config::{Config, FileSyncConfig, SyncConfig, WebSyncConfig};
pub use error::{Error, Result};
pub use guarded::{GuardedList, GuardedQueue, GuardedStack};
pub use hash::{compare_hashes, compute_hash, from_hex, to_hex, HashAlgorithm};
pub use ledger::Ledger;
pub use monitor::{Breach, IntegrityObserver, LogObserver, StructureKind};
pub use sync::{SyncReport, Synchronizer};
pub use types::{Content, Transaction};
