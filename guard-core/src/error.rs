//! Error types for the guarded ledger
//!
//! Integrity failures are deliberately absent from this taxonomy: a failed
//! verification is a boolean outcome plus a state transition, never an error.

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure (non-success HTTP status, connection error)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed external record (unparseable line or JSON body)
    #[error("Malformed record: {0}")]
    Malformed(String),

    /// Invalid hex input (odd length, non-hex digit)
    #[error("Invalid hex input: {0}")]
    InvalidHex(String),

    /// Unknown hash algorithm name
    #[error("Unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
