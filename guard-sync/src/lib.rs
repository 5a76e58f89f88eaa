//! GuardChain Synchronizer Backends
//!
//! Pull-based reconciliation of a guarded ledger against an external source
//! of truth:
//!
//! - [`FileSynchronizer`]: an append-only newline-delimited JSON record
//!   file, with an mtime-aware in-memory cache
//! - [`WebSynchronizer`]: a pair of HTTP endpoints speaking JSON arrays
//!
//! Both backends assign the authoritative timestamp at the store, never at
//! the client, and both treat transport problems and malformed records as
//! hard errors — integrity semantics stay entirely inside `guard-core`.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod file;
pub mod web;

pub use file::FileSynchronizer;
pub use web::WebSynchronizer;
