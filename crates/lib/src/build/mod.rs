//! Build matrix orchestration.
//!
//! The [`Builder`] walks the requested matrix in a fixed order (mode, then
//! platform, then architecture) and runs one build cycle per cell:
//!
//! 1. reset state to the cell's mode and architecture, discarding stale output
//! 2. run the platform's build procedure to get the toolchain's output directory
//! 3. copy the driver, binding and sidecar libraries into
//!    `<root>/<bin>/<driver>/<platform dir>/<mode>`
//! 4. discover the platform's runtime directory, copy its libraries next to the
//!    driver and record their names for the manifest
//!
//! Cycles run strictly one after another. Any failure aborts the whole run.

mod types;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::execute::CommandRunner;
use crate::fs::FileOps;
use crate::platform::{Arch, BuildMode, Platform};

pub use types::*;

/// Expand the requested matrix into build cells, in execution order.
///
/// Platforms that separate architectures get one cell per supported
/// architecture; unsupported ones are skipped with a warning. Platforms that
/// build every architecture at once get a single cell with no architecture,
/// however many were requested.
pub fn expand_matrix(modes: &[BuildMode], platforms: &[Platform], archs: &[Arch]) -> Vec<BuildTarget> {
  let mut cells = Vec::new();
  for &mode in modes {
    for &platform in platforms {
      if !platform.separate_archs() {
        cells.push(BuildTarget::new(platform, None, mode));
        continue;
      }
      for &arch in archs {
        if !platform.supports(arch) {
          warn!(platform = %platform, arch = %arch, "skipping unsupported architecture");
          continue;
        }
        cells.push(BuildTarget::new(platform, Some(arch), mode));
      }
    }
  }
  cells
}

/// Mutable session state of a [`Builder`].
#[derive(Debug, Clone, Default)]
pub struct BuilderState {
  pub mode: Option<BuildMode>,
  pub arch: Option<Arch>,
  pub report: BuildReport,
}

/// Drives the toolchain across the build matrix and collects the results.
pub struct Builder<R, F> {
  runner: R,
  fs: F,
  options: BuildOptions,
  state: BuilderState,
}

impl<R, F> Builder<R, F>
where
  R: CommandRunner,
  F: FileOps,
{
  pub fn new(runner: R, fs: F, options: BuildOptions) -> Self {
    Self {
      runner,
      fs,
      options,
      state: BuilderState::default(),
    }
  }

  pub fn options(&self) -> &BuildOptions {
    &self.options
  }

  pub fn state(&self) -> &BuilderState {
    &self.state
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  pub fn fs(&self) -> &F {
    &self.fs
  }

  /// Build every cell of the requested matrix.
  pub async fn build_all(&mut self) -> Result<BuildReport, BuildError> {
    let cells = expand_matrix(&self.options.modes, &self.options.platforms, &self.options.archs);
    info!(
      driver = %self.options.driver_name,
      cells = cells.len(),
      "starting build matrix"
    );

    for target in cells {
      self.build_cycle(target).await?;
    }

    Ok(self.state.report.clone())
  }

  /// Run one build cycle and record it in the report.
  pub async fn build_cycle(&mut self, target: BuildTarget) -> Result<(), BuildError> {
    info!(target = %target, "building");
    self.prepare(target.mode, target.arch);

    let destination = self.options.destination_dir(&target);
    let driver_path = self.options.driver_path();
    let ctx = CycleContext {
      runner: &self.runner,
      fs: &self.fs,
      driver_name: &self.options.driver_name,
      binding: &self.options.binding_library,
      driver_path: &driver_path,
      home_dir: self.options.home_dir.as_deref(),
      mode: target.mode,
      arch: target.arch,
      destination,
    };

    let bin_path = target.platform.build(&ctx).await?;
    debug!(bin_path = %bin_path.display(), "toolchain output directory");

    self.copy_extension_binaries(&bin_path, &target, &ctx.destination)?;

    let runtime_dir = target
      .platform
      .discover_runtime_dir(&ctx)
      .await?
      .filter(|dir| self.runtime_dir_exists(dir));
    if let Some(runtime_dir) = runtime_dir {
      let copied = self.copy_runtime_libraries(&runtime_dir, &target, &ctx.destination)?;
      self.state.report.dependencies.insert(target.directory(), copied);
    } else {
      debug!(target = %target, "no runtime dependencies to bundle");
    }

    self.state.report.targets.push(target);
    Ok(())
  }

  fn runtime_dir_exists(&self, dir: &Path) -> bool {
    let exists = self.fs.file_exists(dir);
    if !exists {
      warn!(dir = %dir.display(), "runtime directory does not exist");
    }
    exists
  }

  fn prepare(&mut self, mode: BuildMode, arch: Option<Arch>) {
    self.runner.discard_output();
    self.state.mode = Some(mode);
    self.state.arch = arch;
  }

  /// Copy the driver, binding and sidecar libraries named by the platform.
  fn copy_extension_binaries(&self, bin_path: &Path, target: &BuildTarget, destination: &Path) -> Result<(), BuildError> {
    let names = target
      .platform
      .library_names(&self.options.driver_name, &self.options.binding_library)?;

    for pair in names {
      for library in [pair.driver, pair.binding] {
        info!(library = %library, "copying extension library");
        self.copy_file(&library, bin_path, destination)?;
      }
    }
    Ok(())
  }

  /// Copy every runtime library in `runtime_dir` and return the copied names.
  fn copy_runtime_libraries(
    &self,
    runtime_dir: &Path,
    target: &BuildTarget,
    destination: &Path,
  ) -> Result<Vec<String>, BuildError> {
    let entries = self
      .fs
      .list_directory(runtime_dir)
      .map_err(|source| BuildError::io("list runtime directory", runtime_dir, source))?;

    let mut copied = Vec::new();
    for name in entries {
      if !target.platform.is_runtime_library(&name) {
        continue;
      }
      info!(library = %name, "copying runtime library");
      self.copy_file(&name, runtime_dir, destination)?;
      copied.push(name);
    }
    Ok(copied)
  }

  /// Copy `name` from `from` into `to`, creating `to` if needed and replacing an existing file.
  fn copy_file(&self, name: &str, from: &Path, to: &Path) -> Result<(), BuildError> {
    if !self.fs.file_exists(to) {
      self
        .fs
        .create_directory(to, true)
        .map_err(|source| BuildError::io("create directory", to, source))?;
    }

    let dst = to.join(name);
    if self.fs.file_exists(&dst) {
      self
        .fs
        .remove_file(&dst)
        .map_err(|source| BuildError::io("remove", &dst, source))?;
    }

    let src = from.join(name);
    self
      .fs
      .copy_file(&src, &dst)
      .map_err(|source| BuildError::io("copy", &src, source))
  }
}
