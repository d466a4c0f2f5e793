//! Captured command output.

use std::io::Write;
use std::sync::Mutex;

use tracing::debug;

/// Receives every decoded chunk of subprocess output as soon as it arrives.
pub trait OutputObserver: Send + Sync {
  fn observe(&self, chunk: &str);
}

/// Echoes subprocess output to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutEcho;

impl OutputObserver for StdoutEcho {
  fn observe(&self, chunk: &str) {
    let mut stdout = std::io::stdout().lock();
    // Echo is best effort; a closed stdout must not fail the build.
    let _ = stdout.write_all(chunk.as_bytes());
    let _ = stdout.flush();
  }
}

/// Discards subprocess output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl OutputObserver for Silent {
  fn observe(&self, _chunk: &str) {}
}

/// Append-only text accumulator, emptied by [`OutputBuffer::drain`].
#[derive(Debug, Default)]
pub struct OutputBuffer {
  content: Mutex<String>,
}

impl OutputBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn append(&self, chunk: &str) {
    self.lock().push_str(chunk);
  }

  /// Take everything captured so far, leaving the buffer empty.
  pub fn drain(&self) -> String {
    std::mem::take(&mut *self.lock())
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, String> {
    // A poisoned buffer only means a panic happened mid-append; the text is still usable.
    self.content.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

/// Incremental UTF-8 decoder for one output pipe.
///
/// A character split across two reads is held back until the rest of it arrives.
/// Invalid byte sequences are dropped.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
  pending: Vec<u8>,
}

impl Utf8Decoder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Decode `bytes` following whatever the previous call held back.
  pub fn decode(&mut self, bytes: &[u8]) -> String {
    self.pending.extend_from_slice(bytes);

    let mut text = String::new();
    let mut rest: &[u8] = &self.pending;
    loop {
      match std::str::from_utf8(rest) {
        Ok(valid) => {
          text.push_str(valid);
          rest = &[];
          break;
        }
        Err(e) => {
          let (valid, after) = rest.split_at(e.valid_up_to());
          text.push_str(std::str::from_utf8(valid).unwrap_or_default());
          match e.error_len() {
            Some(invalid) => {
              debug!(bytes = invalid, "dropping undecodable output bytes");
              rest = &after[invalid..];
            }
            None => {
              rest = after;
              break;
            }
          }
        }
      }
    }

    self.pending = rest.to_vec();
    text
  }

  /// Bytes of an incomplete character still waiting for the next read.
  pub fn pending(&self) -> usize {
    self.pending.len()
  }
}
