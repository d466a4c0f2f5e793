//! Swift runtime discovery on Windows.
//!
//! The Windows toolchain installs its runtime per version under
//! `%LocalAppData%\Programs\Swift\Runtimes\<version>\usr\bin`, so the
//! directory is derived from the version `swift -v` reports.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::build::{BuildError, CycleContext};
use crate::execute::CommandRunner;
use crate::fs::FileOps;

/// Debug info format that produces `.pdb` files next to the DLLs.
pub const DEBUG_INFO_FORMAT: &str = "codeview";

pub async fn discover_runtime_dir<R, F>(ctx: &CycleContext<'_, R, F>) -> Result<Option<PathBuf>, BuildError>
where
  R: CommandRunner,
  F: FileOps,
{
  let Some(home) = ctx.home_dir else {
    warn!("home directory unknown, cannot locate swift runtime");
    return Ok(None);
  };

  let info = ctx.runner.run("swift -v").await?;
  match parse_swift_version(&info) {
    Some(version) => {
      let dir = runtime_dir(home, &version);
      debug!(version = %version, dir = %dir.display(), "derived swift runtime directory");
      Ok(Some(dir))
    }
    None => {
      warn!("could not read swift version from `swift -v`");
      Ok(None)
    }
  }
}

/// Version token following `version` on the first line that mentions one.
///
/// `compnerd.org Swift version 6.0.3 (swift-6.0.3-RELEASE)` yields `6.0.3`.
pub fn parse_swift_version(info: &str) -> Option<String> {
  info.lines().find_map(|line| {
    let mut tokens = line.split_whitespace();
    tokens.find(|t| *t == "version")?;
    tokens.next().map(str::to_string)
  })
}

pub fn runtime_dir(home: &Path, version: &str) -> PathBuf {
  home
    .join("AppData")
    .join("Local")
    .join("Programs")
    .join("Swift")
    .join("Runtimes")
    .join(version)
    .join("usr")
    .join("bin")
}
