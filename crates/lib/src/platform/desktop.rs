//! `swift build` flow shared by Linux, macOS and Windows.

use std::path::PathBuf;

use crate::build::{BuildError, CycleContext};
use crate::execute::CommandRunner;
use crate::execute::shell::quote_path;
use crate::fs::FileOps;

/// Compose the package build command for the cycle's architecture and mode.
///
/// `cd <driver> && swift build --arch <arch> --configuration <mode> [-debug-info-format <fmt>]`
pub fn swift_build_command<R, F>(ctx: &CycleContext<'_, R, F>, debug_info_format: Option<&str>) -> String {
  let mut parts = vec![
    format!("cd {}", quote_path(ctx.driver_path)),
    "&&".to_string(),
    "swift build".to_string(),
  ];
  if let Some(arch) = ctx.arch {
    parts.push(format!("--arch {}", arch.as_str()));
  }
  parts.push(format!("--configuration {}", ctx.mode.as_str()));
  if let Some(format) = debug_info_format {
    parts.push(format!("-debug-info-format {format}"));
  }
  parts.join(" ")
}

/// Build the package, then ask the toolchain where it put the binaries.
pub async fn build<R, F>(ctx: &CycleContext<'_, R, F>, debug_info_format: Option<&str>) -> Result<PathBuf, BuildError>
where
  R: CommandRunner,
  F: FileOps,
{
  let cmd = swift_build_command(ctx, debug_info_format);
  ctx.runner.run(&cmd).await?;

  let reported = ctx.runner.run(&format!("{cmd} --show-bin-path")).await?;
  parse_bin_path(&reported).ok_or(BuildError::MissingBinPath { cmd })
}

/// The bin path is the last non-empty line the toolchain printed.
fn parse_bin_path(output: &str) -> Option<PathBuf> {
  output
    .lines()
    .map(str::trim)
    .rfind(|line| !line.is_empty())
    .map(PathBuf::from)
}
