//! File-backed synchronizer
//!
//! External store: an append-only, newline-delimited UTF-8 file with one
//! JSON record per transaction (`{"timestamp":..,"content":..}`). Writes
//! flush immediately — durability over batching. Reads serve from an
//! in-memory cache that is re-scanned only when the file's modified time
//! has advanced past the last-seen value.

use async_trait::async_trait;
use chrono::Utc;
use guard_core::{Content, Error, Result, Synchronizer, Transaction};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::sync::Mutex;
use tracing::debug;

/// Append-only record-file synchronizer
pub struct FileSynchronizer<T: Content> {
    path: PathBuf,
    cache: Mutex<FileCache<T>>,
}

/// Previously-read records plus the file state they were read at
struct FileCache<T> {
    records: Vec<Transaction<T>>,
    last_modified: Option<SystemTime>,
}

impl<T: Content> FileSynchronizer<T> {
    /// Create a synchronizer over the given record file
    ///
    /// Parent directories are created; the file itself is created lazily on
    /// first write. A missing file reads as an empty store.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            path,
            cache: Mutex::new(FileCache {
                records: Vec::new(),
                last_modified: None,
            }),
        })
    }

    /// Record file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-scan the file into the cache if its modified time advanced
    fn refresh(&self, cache: &mut FileCache<T>) -> Result<()> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                cache.records.clear();
                cache.last_modified = None;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let modified = metadata.modified()?;
        if let Some(last_seen) = cache.last_modified {
            if modified <= last_seen {
                return Ok(());
            }
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Transaction<T> = serde_json::from_str(&line).map_err(|e| {
                Error::Malformed(format!("record at line {}: {}", index + 1, e))
            })?;
            records.push(record);
        }

        debug!(path = %self.path.display(), records = records.len(), "rescanned record file");
        cache.records = records;
        cache.last_modified = Some(modified);
        Ok(())
    }

    /// Append one record, store-stamped, flushed immediately
    ///
    /// The assigned timestamp is strictly greater than the last record's,
    /// so write order and timestamp order always agree even for
    /// back-to-back writes within one millisecond.
    fn append_record(
        &self,
        cache: &mut FileCache<T>,
        file: &mut File,
        content: T,
    ) -> Result<Transaction<T>> {
        let last = cache.records.last().map(|r| r.timestamp()).unwrap_or(0);
        let timestamp = Utc::now().timestamp_millis().max(last + 1);
        let stored = Transaction::new(timestamp, content);

        let mut line = serde_json::to_string(&stored)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        file.flush()?;

        cache.records.push(stored.clone());
        Ok(stored)
    }

    fn open_append(&self) -> Result<File> {
        Ok(OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?)
    }
}

#[async_trait]
impl<T: Content> Synchronizer<T> for FileSynchronizer<T> {
    async fn read(&self, since_timestamp: i64) -> Result<Vec<Transaction<T>>> {
        let mut cache = self.cache.lock().await;
        self.refresh(&mut cache)?;

        // Records are monotonically increasing by write order: scan from the
        // end backward and stop at the first record at or older than the
        // cutoff.
        let mut newer = Vec::new();
        for record in cache.records.iter().rev() {
            if record.timestamp() <= since_timestamp {
                break;
            }
            newer.push(record.clone());
        }
        newer.reverse();
        Ok(newer)
    }

    async fn write(&self, transaction: &Transaction<T>) -> Result<Transaction<T>> {
        let mut cache = self.cache.lock().await;
        self.refresh(&mut cache)?;

        let mut file = self.open_append()?;
        let stored = self.append_record(&mut cache, &mut file, transaction.content().clone())?;
        cache.last_modified = Some(std::fs::metadata(&self.path)?.modified()?);
        Ok(stored)
    }

    async fn write_batch(&self, transactions: &[Transaction<T>]) -> Result<Vec<Transaction<T>>> {
        if transactions.is_empty() {
            return Ok(Vec::new());
        }

        let mut cache = self.cache.lock().await;
        self.refresh(&mut cache)?;

        let mut file = self.open_append()?;
        let mut stored = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            stored.push(self.append_record(&mut cache, &mut file, transaction.content().clone())?);
        }
        cache.last_modified = Some(std::fs::metadata(&self.path)?.modified()?);
        Ok(stored)
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl<T: Content> std::fmt::Debug for FileSynchronizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSynchronizer")
            .field("path", &self.path)
            .finish()
    }
}
