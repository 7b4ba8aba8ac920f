//! `addrbook` — a personal address book on the command line.
//!
//! # Usage
//!
//! ```text
//! addrbook list
//! addrbook add --first-name Ada --last-name Lovelace --phone 555-0100
//! addrbook edit <id> --company "Analytical Engines"
//! addrbook call <id>
//! addrbook --backend file --data-dir ~/contacts list
//! ```

mod commands;
mod linker;
mod render;
mod settings;
mod storage;

use std::{
  io::{self, BufRead, Write},
  path::PathBuf,
};

use addrbook_core::ContactStore;
use anyhow::Context as _;
use clap::Parser;
use commands::Command;
use linker::SystemLinker;
use settings::{AppConfig, Backend, Overrides};
use storage::Storage;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "addrbook", author, version, about = "Personal address book")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "addrbook.toml")]
  config: PathBuf,

  /// Persistence backend; overrides the config file.
  #[arg(long, global = true)]
  backend: Option<Backend>,

  /// Directory holding the contact data; overrides the config file.
  #[arg(long, global = true, value_name = "DIR")]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so they never mix with command output.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = AppConfig::load(&cli.config, Overrides {
    backend:  cli.backend,
    data_dir: cli.data_dir,
  })?;

  let storage = Storage::open(&cfg).await;
  let store = ContactStore::new(storage);

  let loaded = store.initialize().await;
  if let Some(err) = loaded.warning() {
    eprintln!("warning: could not load saved contacts, showing sample data ({err})");
  }

  if let Command::Delete { id, yes: false } = &cli.command
    && !confirm_delete(&store, id)?
  {
    println!("Cancelled");
    return Ok(());
  }

  let linker = SystemLinker::new(cfg.opener.as_deref());
  let mut stdout = io::stdout().lock();
  commands::run(&store, &linker, cli.command, &mut stdout).await
}

/// Ask before deleting, the way a details screen would.
fn confirm_delete(
  store: &ContactStore<Storage>,
  id: &str,
) -> anyhow::Result<bool> {
  let name = store
    .get(&id.into())
    .map(|c| c.display_name())
    .unwrap_or_else(|| id.to_owned());

  print!("Delete {name}? Are you sure you want to delete this contact? [y/N] ");
  io::stdout().flush().ok();

  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("failed to read confirmation")?;
  Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
