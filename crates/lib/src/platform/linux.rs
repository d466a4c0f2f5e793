//! Swift runtime discovery on Linux.
//!
//! The binding library links against the toolchain's Foundation. `ldd` on the
//! copied binding library tells where that runtime lives:
//!
//! ```text
//! libFoundation.so => /usr/share/swift/usr/lib/swift/linux/libFoundation.so (0x00007f...)
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::build::{BuildError, CycleContext};
use crate::execute::CommandRunner;
use crate::execute::shell::quote_path;
use crate::fs::FileOps;

/// Library whose resolved location identifies the runtime directory.
pub const RUNTIME_MARKER: &str = "libFoundation.so";

pub async fn discover_runtime_dir<R, F>(ctx: &CycleContext<'_, R, F>, binding_file: &str) -> Result<Option<PathBuf>, BuildError>
where
  R: CommandRunner,
  F: FileOps,
{
  let library = ctx.destination.join(binding_file);
  let listing = ctx.runner.run(&format!("ldd {}", quote_path(&library))).await?;

  let found = parse_ldd(&listing, RUNTIME_MARKER);
  match &found {
    Some(dir) => debug!(dir = %dir.display(), "found swift runtime"),
    None => warn!(library = %library.display(), marker = RUNTIME_MARKER, "runtime library not found in ldd output"),
  }
  Ok(found)
}

/// Directory of the first library in `listing` whose line mentions `marker`.
///
/// Returns `None` when no line matches, the library did not resolve
/// (`=> not found`), or the resolved path is not absolute.
pub fn parse_ldd(listing: &str, marker: &str) -> Option<PathBuf> {
  let line = listing.lines().find(|line| line.contains(marker))?;
  let (_, resolved) = line.split_once("=>")?;
  let path = Path::new(resolved.split_whitespace().next()?);
  if !path.is_absolute() {
    return None;
  }
  path.parent().map(Path::to_path_buf)
}
