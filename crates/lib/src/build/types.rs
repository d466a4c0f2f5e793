use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::consts::{DEFAULT_BIN_FOLDER, DEFAULT_BINDING_LIBRARY, DEFAULT_MANIFEST_EXTENSION};
use crate::execute::ExecuteError;
use crate::platform::{Arch, BuildMode, Platform};

/// Errors that abort an orchestration run.
#[derive(Debug, Error)]
pub enum BuildError {
  /// A toolchain command failed.
  #[error(transparent)]
  Execute(#[from] ExecuteError),

  /// The platform could not name the libraries for this driver.
  #[error("failed to map library names for driver '{driver}' on {platform}")]
  LibraryMapping { platform: Platform, driver: String },

  /// The toolchain did not report where it put the binaries.
  #[error("no bin path reported by: {cmd}")]
  MissingBinPath { cmd: String },

  /// A file-system operation failed.
  #[error("failed to {action} {path}: {source}")]
  Io {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl BuildError {
  pub fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
    BuildError::Io {
      action,
      path: path.to_path_buf(),
      source,
    }
  }
}

/// One cell of the build matrix.
///
/// `arch` is `None` for platforms whose toolchain builds every architecture at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BuildTarget {
  pub platform: Platform,
  pub arch: Option<Arch>,
  pub mode: BuildMode,
}

impl BuildTarget {
  pub fn new(platform: Platform, arch: Option<Arch>, mode: BuildMode) -> Self {
    Self { platform, arch, mode }
  }

  /// Manifest label: `<name>.<mode>[.<arch alias>]`, e.g. `linux.debug.arm64`.
  pub fn label(&self) -> String {
    match self.arch {
      Some(arch) if self.platform.separate_archs() => {
        format!("{}.{}.{}", self.platform.name(), self.mode, arch.alias())
      }
      _ => format!("{}.{}", self.platform.name(), self.mode),
    }
  }

  /// Platform directory this cell writes into, without the mode segment. Keys runtime dependencies.
  pub fn directory(&self) -> String {
    self.platform.directory(self.arch)
  }

  /// `<platform dir>/<mode>`, relative to the driver's bin folder.
  pub fn relative_dir(&self) -> String {
    format!("{}/{}", self.directory(), self.mode)
  }
}

impl fmt::Display for BuildTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.platform.id(), self.mode)?;
    if let Some(arch) = self.arch {
      write!(f, "-{}", arch)?;
    }
    Ok(())
  }
}

/// Inputs for an orchestration run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Project root; the driver package lives in `<root>/<driver_name>`.
  pub project_root: PathBuf,
  pub driver_name: String,
  /// Folder under the project root receiving binaries and the manifest.
  pub bin_folder: String,
  pub manifest_extension: String,
  /// Base name of the runtime binding library shipped next to every driver.
  pub binding_library: String,
  /// Used to locate toolchain runtimes installed per user.
  pub home_dir: Option<PathBuf>,
  pub platforms: Vec<Platform>,
  pub archs: Vec<Arch>,
  pub modes: Vec<BuildMode>,
}

impl BuildOptions {
  pub fn new(project_root: impl Into<PathBuf>, driver_name: impl Into<String>) -> Self {
    Self {
      project_root: project_root.into(),
      driver_name: driver_name.into(),
      bin_folder: DEFAULT_BIN_FOLDER.to_string(),
      manifest_extension: DEFAULT_MANIFEST_EXTENSION.to_string(),
      binding_library: DEFAULT_BINDING_LIBRARY.to_string(),
      home_dir: None,
      platforms: Vec::new(),
      archs: Vec::new(),
      modes: vec![BuildMode::Debug],
    }
  }

  pub fn driver_path(&self) -> PathBuf {
    self.project_root.join(&self.driver_name)
  }

  /// `<root>/<bin folder>/<driver>`: parent of every platform directory.
  pub fn driver_bin_dir(&self) -> PathBuf {
    self.project_root.join(&self.bin_folder).join(&self.driver_name)
  }

  /// `<root>/<bin folder>/<driver>/<platform dir>/<mode>`
  pub fn destination_dir(&self, target: &BuildTarget) -> PathBuf {
    self.driver_bin_dir().join(target.directory()).join(target.mode.as_str())
  }

  /// `<root>/<bin folder>/<driver>.<manifest extension>`
  pub fn manifest_path(&self) -> PathBuf {
    self
      .project_root
      .join(&self.bin_folder)
      .join(format!("{}.{}", self.driver_name, self.manifest_extension))
  }
}

/// Everything a platform's build procedure may look at or use during one cycle.
pub struct CycleContext<'a, R, F> {
  pub runner: &'a R,
  pub fs: &'a F,
  pub driver_name: &'a str,
  pub binding: &'a str,
  /// `<root>/<driver>`: the package the toolchain builds.
  pub driver_path: &'a Path,
  pub home_dir: Option<&'a Path>,
  pub mode: BuildMode,
  pub arch: Option<Arch>,
  /// Canonical destination directory for this cycle's binaries.
  pub destination: PathBuf,
}

/// Outcome of a full orchestration run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
  /// Built cells, in execution order (mode, then platform, then architecture).
  pub targets: Vec<BuildTarget>,
  /// Runtime library file names copied per platform directory.
  pub dependencies: BTreeMap<String, Vec<String>>,
}

impl BuildReport {
  /// Runtime dependencies recorded for `target`'s platform directory.
  pub fn dependencies_for(&self, target: &BuildTarget) -> &[String] {
    self
      .dependencies
      .get(&target.directory())
      .map(Vec::as_slice)
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn label_uses_engine_names() {
    let target = BuildTarget::new(Platform::Linux, Some(Arch::Aarch64), BuildMode::Debug);
    assert_eq!(target.label(), "linux.debug.arm64");

    let target = BuildTarget::new(Platform::IosSimulator, None, BuildMode::Release);
    assert_eq!(target.label(), "ios.release");
  }

  #[test]
  fn display_uses_ids() {
    let target = BuildTarget::new(Platform::Windows, Some(Arch::X86_64), BuildMode::Release);
    assert_eq!(target.to_string(), "windows-release-x86_64");
    assert_eq!(target.relative_dir(), "windows-x86_64/release");
  }

  #[test]
  fn destination_follows_canonical_layout() {
    let options = BuildOptions::new("/game", "GameDriver");
    let target = BuildTarget::new(Platform::Linux, Some(Arch::Aarch64), BuildMode::Debug);

    assert_eq!(
      options.destination_dir(&target),
      PathBuf::from("/game/bin/GameDriver/linux-aarch64/debug")
    );
    assert_eq!(options.manifest_path(), PathBuf::from("/game/bin/GameDriver.gdextension"));
    assert_eq!(options.driver_path(), PathBuf::from("/game/GameDriver"));
  }

  #[test]
  fn report_looks_up_dependencies_by_directory() {
    let mut report = BuildReport::default();
    report
      .dependencies
      .insert("linux-x86_64".to_string(), vec!["libFoundation.so".to_string()]);

    let debug = BuildTarget::new(Platform::Linux, Some(Arch::X86_64), BuildMode::Debug);
    let other = BuildTarget::new(Platform::Linux, Some(Arch::Aarch64), BuildMode::Debug);

    assert_eq!(report.dependencies_for(&debug), ["libFoundation.so".to_string()]);
    assert!(report.dependencies_for(&other).is_empty());
  }
}
