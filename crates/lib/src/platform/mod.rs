//! Platform descriptors.
//!
//! A [`Platform`] describes one target family: how its libraries are named,
//! which architectures it supports, whether those architectures land in
//! separate output directories, and how the toolchain is driven to build it.
//!
//! Shared behaviour lives in free functions grouped by toolchain:
//! - [`desktop`] - `swift build` for Linux, macOS and Windows
//! - [`ios`] - `xcodebuild archive` for iOS devices and simulators
//! - [`linux`] / [`windows`] - runtime-library discovery

pub mod arch;
pub mod desktop;
pub mod ios;
pub mod linux;
pub mod mode;
pub mod paths;
pub mod windows;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::build::{BuildError, CycleContext};
use crate::execute::CommandRunner;
use crate::fs::FileOps;

pub use arch::Arch;
pub use mode::BuildMode;

/// A string that does not name a known architecture, build mode or platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownValue {
  pub kind: &'static str,
  pub value: String,
  pub expected: &'static str,
}

impl UnknownValue {
  pub fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
    Self {
      kind,
      value: value.to_string(),
      expected,
    }
  }
}

/// Errors raised while validating requested platforms against the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
  #[error("host operating system '{os}' is not supported")]
  UnsupportedHost { os: String },

  #[error("{target} builds require a macOS host")]
  RequiresMacosHost { target: Platform },

  #[error("cross compiling from {host} to {target} is not supported")]
  CrossCompiling { host: Platform, target: Platform },

  #[error("ios and iossimulator share one manifest entry and cannot be built together")]
  DeviceAndSimulator,
}

/// Library file names for one driver: the driver itself and the binding library it loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryPair {
  pub driver: String,
  pub binding: String,
}

/// Target family the extension can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
  #[serde(rename = "linux")]
  Linux,
  #[serde(rename = "macos")]
  MacOs,
  #[serde(rename = "windows")]
  Windows,
  #[serde(rename = "ios")]
  Ios,
  #[serde(rename = "iossimulator")]
  IosSimulator,
}

impl Platform {
  pub const ALL: [Platform; 5] = [
    Platform::Linux,
    Platform::MacOs,
    Platform::Windows,
    Platform::Ios,
    Platform::IosSimulator,
  ];

  /// Detect the platform matching the host operating system.
  pub fn current() -> Result<Self, TargetError> {
    match std::env::consts::OS {
      "linux" => Ok(Self::Linux),
      "macos" => Ok(Self::MacOs),
      "windows" => Ok(Self::Windows),
      os => Err(TargetError::UnsupportedHost { os: os.to_string() }),
    }
  }

  /// Platform name as the engine knows it; used in manifest target labels.
  ///
  /// Device and simulator builds share the `ios` name.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "macos",
      Self::Windows => "windows",
      Self::Ios | Self::IosSimulator => "ios",
    }
  }

  /// Unique identifier; used for output directories and on the command line.
  pub fn id(&self) -> &'static str {
    match self {
      Self::IosSimulator => "iossimulator",
      _ => self.name(),
    }
  }

  /// Extension of the loadable library referenced by the manifest.
  pub fn main_extension(&self) -> &'static str {
    match self {
      Self::Linux => "so",
      Self::MacOs => "dylib",
      Self::Windows => "dll",
      Self::Ios | Self::IosSimulator => "framework",
    }
  }

  /// Extensions of companion files that are copied but never referenced by the manifest.
  pub fn sidecar_extensions(&self) -> &'static [&'static str] {
    match self {
      Self::Windows => &["pdb", "lib"],
      _ => &[],
    }
  }

  pub fn lib_prefix(&self) -> &'static str {
    match self {
      Self::MacOs => "lib",
      _ => "",
    }
  }

  pub fn supported_archs(&self) -> &'static [Arch] {
    &Arch::ALL
  }

  pub fn supports(&self, arch: Arch) -> bool {
    self.supported_archs().contains(&arch)
  }

  /// Whether each architecture gets its own build and output directory.
  ///
  /// Xcode produces every architecture in one archive, so iOS variants build once.
  pub fn separate_archs(&self) -> bool {
    !matches!(self, Self::Ios | Self::IosSimulator)
  }

  /// Output directory name for `arch`: `<id>-<arch>`, or just `<id>` when architectures are not separated.
  pub fn directory(&self, arch: Option<Arch>) -> String {
    match arch {
      Some(arch) if self.separate_archs() => format!("{}-{}", self.id(), arch.as_str()),
      _ => self.id().to_string(),
    }
  }

  /// Xcode destination platform for iOS variants.
  pub fn xcode_destination(&self) -> Option<&'static str> {
    match self {
      Self::Ios => Some("iOS"),
      Self::IosSimulator => Some("iOS Simulator"),
      _ => None,
    }
  }

  /// Primary library file names for `driver_name` and the `binding` library.
  pub fn main_library_names(&self, driver_name: &str, binding: &str) -> LibraryPair {
    self.library_pair(driver_name, binding, self.main_extension())
  }

  /// Every file that has to be copied for one build: the primary pair first, then one pair per sidecar extension.
  pub fn library_names(&self, driver_name: &str, binding: &str) -> Result<Vec<LibraryPair>, BuildError> {
    if !is_valid_file_stem(driver_name) || !is_valid_file_stem(binding) {
      return Err(BuildError::LibraryMapping {
        platform: *self,
        driver: driver_name.to_string(),
      });
    }

    let mut names = vec![self.main_library_names(driver_name, binding)];
    names.extend(
      self
        .sidecar_extensions()
        .iter()
        .map(|ext| self.library_pair(driver_name, binding, ext)),
    );
    Ok(names)
  }

  /// Whether a file in a runtime directory is a library of this platform (`libFoo.so`, `libFoo.so.5`).
  pub fn is_runtime_library(&self, file_name: &str) -> bool {
    let ext = self.main_extension();
    file_name.ends_with(&format!(".{ext}")) || file_name.contains(&format!(".{ext}."))
  }

  /// Run this platform's build procedure and return the directory holding the built libraries.
  pub async fn build<R, F>(&self, ctx: &CycleContext<'_, R, F>) -> Result<PathBuf, BuildError>
  where
    R: CommandRunner,
    F: FileOps,
  {
    match self {
      Self::Linux | Self::MacOs => desktop::build(ctx, None).await,
      Self::Windows => desktop::build(ctx, Some(windows::DEBUG_INFO_FORMAT)).await,
      Self::Ios | Self::IosSimulator => ios::build(ctx, self.xcode_destination().unwrap_or("iOS")).await,
    }
  }

  /// Find the directory of the shared runtime the built libraries link against, if this platform bundles one.
  pub async fn discover_runtime_dir<R, F>(&self, ctx: &CycleContext<'_, R, F>) -> Result<Option<PathBuf>, BuildError>
  where
    R: CommandRunner,
    F: FileOps,
  {
    match self {
      Self::Linux => linux::discover_runtime_dir(ctx, &self.main_library_names(ctx.driver_name, ctx.binding).binding).await,
      Self::Windows => windows::discover_runtime_dir(ctx).await,
      Self::MacOs | Self::Ios | Self::IosSimulator => Ok(None),
    }
  }

  fn library_pair(&self, driver_name: &str, binding: &str, ext: &str) -> LibraryPair {
    let prefix = self.lib_prefix();
    LibraryPair {
      driver: format!("{prefix}{driver_name}.{ext}"),
      binding: format!("{prefix}{binding}.{ext}"),
    }
  }
}

fn is_valid_file_stem(stem: &str) -> bool {
  !stem.is_empty() && !stem.contains(['/', '\\']) && stem != "." && stem != ".."
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.id())
  }
}

impl FromStr for Platform {
  type Err = UnknownValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.to_ascii_lowercase();
    Self::ALL
      .into_iter()
      .find(|p| p.id() == lower)
      .ok_or_else(|| UnknownValue::new("platform", s, "linux, macos, windows, ios, iossimulator"))
  }
}

/// Check that every requested platform can be built on `host`.
///
/// iOS variants need a macOS host; everything else must match the host, since
/// cross compilation is not supported. Device and simulator builds are mutually
/// exclusive because the engine has a single `ios` entry for both.
pub fn validate_targets(host: Platform, targets: &[Platform]) -> Result<(), TargetError> {
  for &target in targets {
    match target {
      Platform::Ios | Platform::IosSimulator => {
        if host != Platform::MacOs {
          return Err(TargetError::RequiresMacosHost { target });
        }
      }
      _ if target != host => return Err(TargetError::CrossCompiling { host, target }),
      _ => {}
    }
  }

  if targets.contains(&Platform::Ios) && targets.contains(&Platform::IosSimulator) {
    return Err(TargetError::DeviceAndSimulator);
  }

  Ok(())
}
