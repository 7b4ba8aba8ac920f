//! Hands `tel:` / `sms:` URIs to the desktop's URI opener.

use std::{
  ffi::OsStr,
  io,
  path::{Path, PathBuf},
};

use addrbook_core::device::{DeviceAction, DeviceLinker};
use tokio::process::Command;

/// Runs an external program with the action URI as its last argument.
#[derive(Debug, Clone)]
pub struct SystemLinker {
  program: String,
  args:    Vec<String>,
}

impl SystemLinker {
  /// Use `opener` when configured, otherwise the platform default.
  pub fn new(opener: Option<&str>) -> Self {
    match opener {
      Some(cmd) => {
        let mut parts = cmd.split_whitespace().map(str::to_owned);
        let program = parts.next().unwrap_or_default();
        Self { program, args: parts.collect() }
      }
      None => Self::platform_default(),
    }
  }

  fn platform_default() -> Self {
    if cfg!(target_os = "macos") {
      Self { program: "open".into(), args: vec![] }
    } else if cfg!(windows) {
      Self {
        program: "cmd".into(),
        args:    vec!["/C".into(), "start".into(), String::new()],
      }
    } else {
      Self { program: "xdg-open".into(), args: vec![] }
    }
  }

  fn resolve(&self) -> Option<PathBuf> {
    if self.program.is_empty() {
      return None;
    }
    let program = Path::new(&self.program);
    if program.components().count() > 1 {
      return program.is_file().then(|| program.to_path_buf());
    }
    std::env::var_os("PATH").and_then(|paths| {
      std::env::split_paths(&paths)
        .flat_map(|dir| candidates(&dir, program.as_os_str()))
        .find(|p| p.is_file())
    })
  }
}

fn candidates(dir: &Path, program: &OsStr) -> Vec<PathBuf> {
  let plain = dir.join(program);
  if cfg!(windows) {
    vec![plain.with_extension("exe"), plain]
  } else {
    vec![plain]
  }
}

impl DeviceLinker for SystemLinker {
  type Error = io::Error;

  async fn can_open(&self, _action: &DeviceAction) -> bool {
    self.resolve().is_some()
  }

  async fn open(&self, action: &DeviceAction) -> io::Result<()> {
    let uri = action.uri();
    tracing::debug!(program = %self.program, %uri, "opening device action");

    let status = Command::new(&self.program)
      .args(&self.args)
      .arg(&uri)
      .status()
      .await?;

    if status.success() {
      Ok(())
    } else {
      Err(io::Error::other(format!("{} exited with {status}", self.program)))
    }
  }
}
