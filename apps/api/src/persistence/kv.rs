use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key '{0}': use letters, digits, '_' or '-'")]
    InvalidKey(String),

    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: u64, quota: u64 },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// String key-value storage. Keys are validated by [`validate_key`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryKvStore
// ────────────────────────────────────────────────────────────────────────────

/// In-process store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FileKvStore
// ────────────────────────────────────────────────────────────────────────────

/// One `<key>.json` file per key inside `dir`.
///
/// `quota_bytes` caps the total size of all values, like browser storage.
pub struct FileKvStore {
    dir: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileKvStore {
    pub async fn open(dir: impl Into<PathBuf>, quota_bytes: Option<u64>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        debug!("File store opened at {}", dir.display());
        Ok(Self { dir, quota_bytes })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Total bytes held by every key except `key`.
    async fn usage_excluding(&self, key: &str) -> Result<u64, StorageError> {
        let skip = self.path_for(key);
        let mut total = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path == skip || !is_value_file(&path) {
                continue;
            }
            total += entry.metadata().await?.len();
        }
        Ok(total)
    }
}

fn is_value_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        if let Some(quota) = self.quota_bytes {
            let needed = self.usage_excluding(key).await? + value.len() as u64;
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        // Temp file + rename: readers never see a partial value.
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
