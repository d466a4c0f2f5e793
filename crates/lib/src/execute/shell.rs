//! Command shell selection.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::execute::types::ExecuteError;
use crate::fs::FileOps;

/// Unix shells probed in order of preference.
#[cfg(unix)]
pub const SHELL_CANDIDATES: &[&str] = &["/bin/zsh", "/bin/sh"];

/// A host shell able to run `cd <dir> && <cmd>` style command strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
  /// Path or name of the shell binary.
  pub program: PathBuf,
  /// Arguments placed before the command string (e.g. `-c`).
  pub args: Vec<String>,
}

impl Shell {
  pub fn new(program: impl Into<PathBuf>, args: &[&str]) -> Self {
    Self {
      program: program.into(),
      args: args.iter().map(|a| a.to_string()).collect(),
    }
  }

  /// Locate the shell used to run build commands.
  ///
  /// On Unix the first existing entry of [`SHELL_CANDIDATES`] wins and is run with `-c`.
  /// On Windows commands go through `cmd.exe /C`, which understands `&&` chaining.
  #[cfg(unix)]
  pub fn detect(fs: &impl FileOps) -> Result<Self, ExecuteError> {
    for candidate in SHELL_CANDIDATES {
      if fs.file_exists(Path::new(candidate)) {
        debug!(shell = %candidate, "using shell");
        return Ok(Self::new(*candidate, &["-c"]));
      }
    }
    Err(ExecuteError::ShellNotFound {
      tried: SHELL_CANDIDATES.join(", "),
    })
  }

  #[cfg(windows)]
  pub fn detect(_fs: &impl FileOps) -> Result<Self, ExecuteError> {
    debug!(shell = "cmd.exe", "using shell");
    Ok(Self::new("cmd.exe", &["/C"]))
  }

  /// Shell as given by the user, with arguments inferred from its name.
  pub fn from_override(shell: &str) -> Self {
    // Either separator, so Windows paths are recognised on any host.
    let name = shell.rsplit(['/', '\\']).next().unwrap_or(shell).to_lowercase();
    if name.starts_with("cmd") {
      Self::new(shell, &["/C"])
    } else {
      Self::new(shell, &["-c"])
    }
  }
}

/// Quote `path` for use in a shell command string, leaving plain paths untouched.
pub fn quote_path(path: &Path) -> String {
  quote_arg(&path.to_string_lossy())
}

/// Quote a single shell argument unless it is made only of safe characters.
pub fn quote_arg(raw: &str) -> String {
  let plain = !raw.is_empty()
    && raw
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '\\' | '.' | '_' | '-' | ':' | '+' | '@'));
  if plain {
    return raw.to_string();
  }
  if cfg!(windows) {
    format!("\"{}\"", raw)
  } else {
    format!("'{}'", raw.replace('\'', "'\\''"))
  }
}
