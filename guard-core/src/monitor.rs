//! Integrity breach notification
//!
//! Guarded structures accept an observer at construction time instead of
//! reaching into a global registry, so game code and tests can inject their
//! own reaction (ban, flag, ignore). Delivery is synchronous at the point of
//! detection — no queuing, no batching.

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::warn;

/// Kind of structure that failed verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    /// Block chain ledger
    Ledger,
    /// Single-hash data chain
    DataChain,
    /// Guarded list
    GuardedList,
    /// Guarded queue
    GuardedQueue,
    /// Guarded stack
    GuardedStack,
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StructureKind::Ledger => "ledger",
            StructureKind::DataChain => "data_chain",
            StructureKind::GuardedList => "guarded_list",
            StructureKind::GuardedQueue => "guarded_queue",
            StructureKind::GuardedStack => "guarded_stack",
        };
        write!(f, "{}", name)
    }
}

/// Description of a detected integrity breach
#[derive(Debug, Clone)]
pub struct Breach {
    /// Kind of structure that failed
    pub structure: StructureKind,

    /// Caller-assigned label of the instance (e.g. "player_score")
    pub label: String,

    /// Detection instant
    pub detected_at: DateTime<Utc>,

    /// What was being verified when the mismatch surfaced
    pub detail: String,
}

impl Breach {
    pub(crate) fn new(structure: StructureKind, label: &str, detail: impl Into<String>) -> Self {
        Self {
            structure,
            label: label.to_string(),
            detected_at: Utc::now(),
            detail: detail.into(),
        }
    }
}

/// Receiver for integrity breach notifications
pub trait IntegrityObserver: Send + Sync {
    /// Called synchronously when a guarded structure detects tampering
    fn on_breach(&self, breach: &Breach);
}

/// Default observer that records breaches through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl IntegrityObserver for LogObserver {
    fn on_breach(&self, breach: &Breach) {
        warn!(
            structure = %breach.structure,
            label = %breach.label,
            detail = %breach.detail,
            "integrity breach detected"
        );
    }
}
