//! `xcodebuild archive` flow for iOS devices and simulators.

use std::path::PathBuf;

use crate::build::{BuildError, CycleContext};
use crate::consts::XCARCHIVE_NAME;
use crate::execute::CommandRunner;
use crate::execute::shell::{quote_arg, quote_path};
use crate::fs::FileOps;

/// Archive the driver package for `destination` (`iOS` or `iOS Simulator`).
///
/// Xcode decides the architectures itself, so the cycle's architecture is ignored.
/// Returns the library folder inside the produced archive.
pub async fn build<R, F>(ctx: &CycleContext<'_, R, F>, destination: &str) -> Result<PathBuf, BuildError>
where
  R: CommandRunner,
  F: FileOps,
{
  let archive = ctx.driver_path.join(XCARCHIVE_NAME);
  if ctx.fs.file_exists(&archive) {
    ctx
      .fs
      .remove_file(&archive)
      .map_err(|source| BuildError::io("remove stale archive", &archive, source))?;
  }

  ctx.runner.run(&archive_command(ctx, destination)).await?;

  Ok(archive.join("Products").join("usr").join("local").join("lib"))
}

pub fn archive_command<R, F>(ctx: &CycleContext<'_, R, F>, destination: &str) -> String {
  [
    format!("cd {}", quote_path(ctx.driver_path)),
    "&&".to_string(),
    "xcodebuild archive".to_string(),
    format!("-scheme {}", quote_arg(ctx.driver_name)),
    format!("-configuration {}", ctx.mode.xcode_name()),
    "-archivePath ./xcodebuild".to_string(),
    format!("-destination 'generic/platform={destination}'"),
  ]
  .join(" ")
}
