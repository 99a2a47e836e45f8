//! Local key-value persistence.
//!
//! The cart is stored the way a browser keeps it in `localStorage`: one
//! string key holding one string value. [`FileStore`] keeps every key in a
//! single JSON object on disk, so the file can be shared with other small
//! client-side settings.

use std::collections::HashMap;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Key under which the cart snapshot is stored.
pub const CART_KEY: &str = "@RocketShoes:cart";

/// Errors from the key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing file is not a JSON object of strings.
    #[error("Corrupt storage file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never written.
    fn get(&self, key: &str)
    -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Overwrite a value.
    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;
}

impl<T: KeyValueStore> KeyValueStore for Arc<T> {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).set(key, value)
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-process store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `key = value`.
    #[must_use]
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.into());
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// Store backed by a single JSON object file.
///
/// Writes go to a uniquely named sibling temp file that is synced and then
/// renamed over the target, so readers and a crash mid-write only ever see a
/// complete file. A missing file reads as empty.
///
/// Several handles may share one path. Each write is atomic, but handles do
/// not coordinate read-modify-write cycles with each other.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(entries).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || atomic_write(&path, &body))
            .await
            .map_err(|e| StorageError::Io {
                path: self.path.clone(),
                source: io::Error::other(e),
            })?
    }
}

/// Write `data` to a fresh temp file beside `path`, sync it, then rename it
/// over `path`.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    let io_err = |source: io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
    temp.write_all(data).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

impl KeyValueStore for FileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display(), bytes = value.len()))]
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries).await?;
        debug!("Storage written");
        Ok(())
    }
}
