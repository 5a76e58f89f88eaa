//! Configuration for guarded structures and synchronization

use crate::hash::HashAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fixed block capacity (must be >= 1)
    pub block_capacity: usize,

    /// Digest algorithm used for sealing and verification
    pub algorithm: HashAlgorithm,

    /// Synchronization backend
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_capacity: 16,
            algorithm: HashAlgorithm::Sha256,
            sync: SyncConfig::None,
        }
    }
}

/// Synchronization backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum SyncConfig {
    /// No external store
    #[default]
    None,

    /// Append-only newline-delimited record file
    File(FileSyncConfig),

    /// Paired HTTP read/write endpoints
    Web(WebSyncConfig),
}

/// File backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSyncConfig {
    /// Record file path
    pub path: PathBuf,
}

/// Web backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSyncConfig {
    /// Endpoint queried with `?timestamp=<cutoff>`
    pub read_endpoint: String,

    /// Endpoint receiving POSTed JSON arrays
    pub write_endpoint: String,

    /// HTTP round-trip timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for WebSyncConfig {
    fn default() -> Self {
        Self {
            read_endpoint: String::new(),
            write_endpoint: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Config {
    /// Load from TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(capacity) = std::env::var("GUARDCHAIN_BLOCK_CAPACITY") {
            config.block_capacity = capacity
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid block capacity: {}", e)))?;
        }

        if let Ok(algorithm) = std::env::var("GUARDCHAIN_ALGORITHM") {
            config.algorithm = HashAlgorithm::from_name(&algorithm)?;
        }

        if let Ok(path) = std::env::var("GUARDCHAIN_SYNC_FILE") {
            config.sync = SyncConfig::File(FileSyncConfig {
                path: PathBuf::from(path),
            });
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.block_capacity == 0 {
            return Err(crate::Error::Config(
                "block_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
