//! Runtime selection of the persistence provider.

use std::convert::Infallible;

use addrbook_core::kv::{FileStore, KeyValueStore, MemoryStore};
use addrbook_store_sqlite::SqliteStore;
use thiserror::Error;

use crate::settings::{AppConfig, Backend};

#[derive(Debug, Error)]
pub enum StorageError {
  #[error(transparent)]
  Sqlite(#[from] addrbook_store_sqlite::Error),
  #[error(transparent)]
  File(#[from] std::io::Error),
  #[error("storage unavailable: {0}")]
  Unavailable(String),
}

impl From<Infallible> for StorageError {
  fn from(never: Infallible) -> Self { match never {} }
}

/// The configured provider, chosen once at startup.
pub enum Storage {
  Sqlite(SqliteStore),
  File(FileStore),
  Memory(MemoryStore),
  /// The configured backend could not be opened. Every read and write fails
  /// with the reason, so the contact store falls back to the seed set and
  /// reports mutations as not persisted.
  Unavailable(String),
}

impl Storage {
  pub async fn open(cfg: &AppConfig) -> Self {
    let storage = match cfg.backend {
      Backend::Sqlite => {
        let path = cfg.data_dir.join("addrbook.db");
        match SqliteStore::open(&path).await {
          Ok(store) => Self::Sqlite(store),
          Err(err) => {
            tracing::warn!(path = ?path, error = %err, "failed to open store");
            Self::Unavailable(format!("failed to open {}: {err}", path.display()))
          }
        }
      }
      Backend::File => Self::File(FileStore::new(&cfg.data_dir)),
      Backend::Memory => Self::Memory(MemoryStore::new()),
    };
    tracing::debug!(backend = cfg.backend.as_str(), dir = ?cfg.data_dir, "storage ready");
    storage
  }
}

impl KeyValueStore for Storage {
  type Error = StorageError;

  async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(match self {
      Self::Sqlite(s) => s.get(key).await?,
      Self::File(s) => s.get(key).await?,
      Self::Memory(s) => s.get(key).await?,
      Self::Unavailable(reason) => return Err(StorageError::Unavailable(reason.clone())),
    })
  }

  async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
    match self {
      Self::Sqlite(s) => s.set(key, value).await?,
      Self::File(s) => s.set(key, value).await?,
      Self::Memory(s) => s.set(key, value).await?,
      Self::Unavailable(reason) => return Err(StorageError::Unavailable(reason.clone())),
    }
    Ok(())
  }
}
