//! Types for command execution.

use thiserror::Error;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// Command exited with a non-zero status. `code` is `None` when the process was killed by a signal.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// No usable command shell exists on this host.
  #[error("unable to locate a command shell (tried {tried})")]
  ShellNotFound { tried: String },

  /// I/O error while spawning or waiting on the process.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
