//! The `KeyValueStore` trait and the simple providers that ship with core.
//!
//! The trait is implemented by persistence backends (e.g.
//! `addrbook-store-sqlite`). The [`crate::ContactStore`] depends on this
//! abstraction, not on any concrete backend.

use std::{
  collections::HashMap,
  future::Future,
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A durable string-to-string map.
///
/// All methods return `Send` futures so the store can be shared across tasks
/// in a multi-threaded runtime.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value under `key`. Returns `None` if nothing was ever written.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Replace the value under `key`.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

impl<T: KeyValueStore> KeyValueStore for Arc<T> {
  type Error = T::Error;

  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a {
    (**self).get(key)
  }

  fn set<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a {
    (**self).set(key, value)
  }
}

// ─── In-memory ───────────────────────────────────────────────────────────────

/// A process-local provider. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
    // A poisoned map is still a consistent map: every write is a single insert.
    self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl KeyValueStore for MemoryStore {
  type Error = std::convert::Infallible;

  async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
    Ok(self.entries().get(key).cloned())
  }

  async fn set(&self, key: &str, value: String) -> Result<(), Self::Error> {
    self.entries().insert(key.to_owned(), value);
    Ok(())
  }
}

// ─── JSON files ──────────────────────────────────────────────────────────────

/// One `<key>.json` file per key inside a data directory.
///
/// Writes go to a sibling temp file that is then renamed over the target, so
/// a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  /// The directory is created lazily on first write.
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }

  fn path_for(&self, key: &str) -> io::Result<PathBuf> {
    if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
      return Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("invalid storage key: {key:?}"),
      ));
    }
    Ok(self.dir.join(format!("{key}.json")))
  }
}

impl KeyValueStore for FileStore {
  type Error = io::Error;

  async fn get(&self, key: &str) -> io::Result<Option<String>> {
    let path = self.path_for(key)?;
    match tokio::fs::read_to_string(&path).await {
      Ok(raw) => Ok(Some(raw)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn set(&self, key: &str, value: String) -> io::Result<()> {
    let path = self.path_for(key)?;
    tokio::fs::create_dir_all(&self.dir).await?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, value.as_bytes()).await?;
    tokio::fs::rename(&tmp, &path).await?;
    Ok(())
  }
}
