//! HTTP-backed synchronizer
//!
//! External store: a pair of endpoints. Reads issue
//! `GET {read_endpoint}?timestamp={cutoff}` and expect a JSON array of
//! `{timestamp, content}` records with server-assigned timestamps. Writes
//! issue `POST {write_endpoint}` with a JSON array of `{content}` objects —
//! client timestamps are stripped so a compromised client cannot forge
//! "older" records. Any non-success status is a hard transport failure,
//! never a partial-write assumption.

use async_trait::async_trait;
use guard_core::{Content, Error, Result, Synchronizer, Transaction, WebSyncConfig};
use reqwest::Client;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::debug;

/// HTTP endpoint-pair synchronizer
pub struct WebSynchronizer<T: Content> {
    config: WebSyncConfig,
    client: Client,
    _content: PhantomData<fn() -> T>,
}

/// Write-side record shape: content only, timestamp left to the server
#[derive(Serialize)]
struct WriteRecord<'a, T> {
    content: &'a T,
}

impl<T: Content> WebSynchronizer<T> {
    /// Create a synchronizer over the configured endpoint pair
    pub fn new(config: WebSyncConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            config,
            client,
            _content: PhantomData,
        })
    }
}

#[async_trait]
impl<T: Content> Synchronizer<T> for WebSynchronizer<T> {
    async fn read(&self, since_timestamp: i64) -> Result<Vec<Transaction<T>>> {
        let url = format!("{}?timestamp={}", self.config.read_endpoint, since_timestamp);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "read endpoint returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<Transaction<T>> =
            serde_json::from_str(&body).map_err(|e| Error::Malformed(e.to_string()))?;
        debug!(records = records.len(), since_timestamp, "read from web store");
        Ok(records)
    }

    async fn write(&self, transaction: &Transaction<T>) -> Result<Transaction<T>> {
        let mut stored = self.write_batch(std::slice::from_ref(transaction)).await?;
        Ok(stored.pop().unwrap_or_else(|| transaction.clone()))
    }

    async fn write_batch(&self, transactions: &[Transaction<T>]) -> Result<Vec<Transaction<T>>> {
        if transactions.is_empty() {
            return Ok(Vec::new());
        }

        let payload: Vec<WriteRecord<'_, T>> = transactions
            .iter()
            .map(|t| WriteRecord {
                content: t.content(),
            })
            .collect();

        let response = self
            .client
            .post(&self.config.write_endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "write endpoint returned {}: {}",
                status, body
            )));
        }

        // Servers that echo the stored records let callers advance their
        // sync cutoff past their own writes; otherwise the client falls
        // back to its local stamps as an approximation.
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<Vec<Transaction<T>>>(&body) {
            Ok(stored) if stored.len() == transactions.len() => Ok(stored),
            _ => Ok(transactions.to_vec()),
        }
    }

    fn name(&self) -> &str {
        "web"
    }
}

impl<T: Content> std::fmt::Debug for WebSynchronizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSynchronizer")
            .field("read_endpoint", &self.config.read_endpoint)
            .field("write_endpoint", &self.config.write_endpoint)
            .finish()
    }
}
