//! External command execution.
//!
//! Every toolchain invocation goes through a [`CommandRunner`]. The production
//! runner, [`ShellRunner`], spawns the command through the host shell, drains
//! stdout and stderr on background tasks into one queue, echoes each decoded
//! chunk to an [`OutputObserver`] and accumulates it in an [`OutputBuffer`].
//!
//! Captured output is drained when a command finishes (successfully or not)
//! and whenever [`CommandRunner::discard_output`] is called, so no chunk is
//! ever returned twice.

pub mod output;
pub mod shell;
pub mod types;

use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub use output::{OutputBuffer, OutputObserver, Silent, StdoutEcho, Utf8Decoder};
pub use shell::Shell;
pub use types::ExecuteError;

/// Size of a single read from a child's output pipe.
const READ_CHUNK_SIZE: usize = 4096;

/// Runs one command string at a time and returns its captured output.
pub trait CommandRunner {
  /// Run `command` to completion.
  ///
  /// Returns the merged stdout/stderr text on exit code zero, and
  /// [`ExecuteError::CmdFailed`] otherwise.
  fn run(&self, command: &str) -> impl Future<Output = Result<String, ExecuteError>>;

  /// Drop any output captured but not yet returned.
  fn discard_output(&self) {}
}

/// [`CommandRunner`] that runs commands through the host shell.
pub struct ShellRunner {
  shell: Shell,
  observer: Arc<dyn OutputObserver>,
  buffer: OutputBuffer,
}

impl ShellRunner {
  pub fn new(shell: Shell, observer: Arc<dyn OutputObserver>) -> Self {
    Self {
      shell,
      observer,
      buffer: OutputBuffer::new(),
    }
  }

  fn accept(&self, chunk: &str) {
    self.observer.observe(chunk);
    self.buffer.append(chunk);
  }
}

impl CommandRunner for ShellRunner {
  async fn run(&self, command: &str) -> Result<String, ExecuteError> {
    info!(cmd = %command, "running command");

    let mut child = Command::new(&self.shell.program)
      .args(&self.shell.args)
      .arg(command)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    if let Some(stdout) = child.stdout.take() {
      tokio::spawn(pump(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
      tokio::spawn(pump(stderr, tx.clone()));
    }
    // The queue closes once both pumps hit end-of-stream.
    drop(tx);

    while let Some(chunk) = rx.recv().await {
      self.accept(&chunk);
    }

    let status = child.wait().await?;
    let captured = self.buffer.drain();

    if !status.success() {
      debug!(cmd = %command, output = %captured, "command output before failure");
      return Err(ExecuteError::CmdFailed {
        cmd: command.to_string(),
        code: status.code(),
      });
    }

    Ok(captured)
  }

  fn discard_output(&self) {
    let stale = self.buffer.drain();
    if !stale.is_empty() {
      debug!(bytes = stale.len(), "discarded stale command output");
    }
  }
}

/// Forward decoded chunks from a child pipe until end-of-stream.
async fn pump<R>(mut reader: R, tx: mpsc::UnboundedSender<String>)
where
  R: AsyncRead + Unpin,
{
  let mut buf = vec![0u8; READ_CHUNK_SIZE];
  let mut decoder = Utf8Decoder::new();
  loop {
    match reader.read(&mut buf).await {
      Ok(0) => break,
      Ok(n) => {
        let text = decoder.decode(&buf[..n]);
        if !text.is_empty() && tx.send(text).is_err() {
          break;
        }
      }
      Err(e) => {
        debug!(error = %e, "output pipe read failed");
        break;
      }
    }
  }
  if decoder.pending() > 0 {
    debug!(bytes = decoder.pending(), "dropping truncated character at end of output");
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;

  #[derive(Default)]
  struct Recorder {
    chunks: Mutex<Vec<String>>,
  }

  impl OutputObserver for Recorder {
    fn observe(&self, chunk: &str) {
      self.chunks.lock().unwrap().push(chunk.to_string());
    }
  }

  #[cfg(unix)]
  fn sh() -> Shell {
    Shell::new("/bin/sh", &["-c"])
  }

  #[cfg(windows)]
  fn sh() -> Shell {
    Shell::new("cmd.exe", &["/C"])
  }

  #[tokio::test]
  async fn run_returns_captured_output() {
    let runner = ShellRunner::new(sh(), Arc::new(Silent));

    let output = runner.run("echo hello").await.unwrap();

    assert_eq!(output.trim(), "hello");
  }

  #[tokio::test]
  async fn empty_output_is_success() {
    let runner = ShellRunner::new(sh(), Arc::new(Silent));

    let output = runner.run("exit 0").await.unwrap();

    assert_eq!(output, "");
  }

  #[tokio::test]
  async fn non_zero_exit_is_cmd_failed() {
    let runner = ShellRunner::new(sh(), Arc::new(Silent));

    let result = runner.run("exit 3").await;

    assert!(matches!(result, Err(ExecuteError::CmdFailed { code: Some(3), .. })));
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn stderr_is_merged_into_output() {
    let runner = ShellRunner::new(sh(), Arc::new(Silent));

    let output = runner.run("echo out; echo err 1>&2").await.unwrap();

    assert!(output.contains("out"));
    assert!(output.contains("err"));
  }

  #[tokio::test]
  async fn observer_sees_every_chunk() {
    let recorder = Arc::new(Recorder::default());
    let runner = ShellRunner::new(sh(), recorder.clone());

    let output = runner.run("echo observed").await.unwrap();

    let seen: String = recorder.chunks.lock().unwrap().concat();
    assert_eq!(seen, output);
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn output_is_never_delivered_twice() {
    let runner = ShellRunner::new(sh(), Arc::new(Silent));

    let first = runner.run("echo first").await.unwrap();
    let second = runner.run("echo second").await.unwrap();

    assert_eq!(first.trim(), "first");
    assert_eq!(second.trim(), "second");
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn failed_command_output_does_not_leak_into_next_command() {
    let runner = ShellRunner::new(sh(), Arc::new(Silent));

    let _ = runner.run("echo broken; exit 1").await;
    let next = runner.run("echo clean").await.unwrap();

    assert_eq!(next.trim(), "clean");
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn invalid_utf8_chunks_are_dropped() {
    let runner = ShellRunner::new(sh(), Arc::new(Silent));

    let output = runner.run("printf '\\377\\376'").await.unwrap();

    assert_eq!(output, "");
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn character_split_across_reads_is_kept() {
    let runner = ShellRunner::new(sh(), Arc::new(Silent));

    // One byte short of a full read, so the two-byte character straddles the boundary.
    let output = runner
      .run("s=$(head -c 4095 /dev/zero | tr '\\0' a); printf '%s\\303\\251tail\\n' \"$s\"")
      .await
      .unwrap();

    assert_eq!(output.len(), 4102);
    assert!(output.ends_with("\u{e9}tail\n"));
  }

  #[test]
  fn discard_output_empties_buffer() {
    let runner = ShellRunner::new(sh(), Arc::new(Silent));
    runner.accept("stale");

    runner.discard_output();

    assert!(runner.buffer.is_empty());
  }
}
