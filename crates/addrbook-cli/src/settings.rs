//! Runtime configuration: an optional TOML file layered under `ADDRBOOK_*`
//! environment variables and command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Which persistence provider backs the contact store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// A SQLite database at `<data_dir>/addrbook.db`.
  #[default]
  Sqlite,
  /// A JSON file at `<data_dir>/contacts.json`.
  File,
  /// Process memory only; every run starts from the sample contacts.
  Memory,
}

impl Backend {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Sqlite => "sqlite",
      Self::File => "file",
      Self::Memory => "memory",
    }
  }
}

/// Settings deserialised from the layered sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub backend:  Backend,
  pub data_dir: PathBuf,
  /// Program used to open `tel:` and `sms:` URIs. Defaults to the platform
  /// opener.
  pub opener:   Option<String>,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      backend:  Backend::default(),
      data_dir: default_data_dir(),
      opener:   None,
    }
  }
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
  pub backend:  Option<Backend>,
  pub data_dir: Option<PathBuf>,
}

impl AppConfig {
  pub fn load(path: &Path, overrides: Overrides) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ADDRBOOK"))
      .set_override_option("backend", overrides.backend.map(Backend::as_str))?
      .set_override_option(
        "data_dir",
        overrides
          .data_dir
          .map(|dir| dir.to_string_lossy().into_owned()),
      )?
      .build()
      .context("failed to read config file")?;

    let mut cfg: AppConfig = settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")?;
    cfg.data_dir = expand_tilde(&cfg.data_dir);
    Ok(cfg)
  }
}

fn default_data_dir() -> PathBuf {
  std::env::var_os("XDG_DATA_HOME")
    .map(PathBuf::from)
    .map(|dir| dir.join("addrbook"))
    .unwrap_or_else(|| PathBuf::from("~/.local/share/addrbook"))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
