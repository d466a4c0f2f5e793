//! Engine manifest (`.gdextension`) model.
//!
//! A [`Manifest`] folds the outcome of a build run into three sections:
//!
//! - `[configuration]`: entry symbol, compatibility range and flags
//! - `[libraries]`: one `<platform>.<mode>[.<arch>]` entry per built target,
//!   pointing at the driver library
//! - `[dependencies]`: per target, the binding library and any bundled
//!   runtime libraries, each mapped to an empty string

mod types;

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::build::{BuildOptions, BuildReport, BuildTarget};
use crate::fs::FileOps;
use crate::tscn::{Document, Encoder, Properties};

pub use types::*;

pub const CONFIGURATION_SECTION: &str = "configuration";
pub const LIBRARIES_SECTION: &str = "libraries";
pub const DEPENDENCIES_SECTION: &str = "dependencies";

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
  pub driver_name: String,
  pub binding_library: String,
  pub configuration: Configuration,
  /// Prefix for every library path, e.g. `res://bin/GameDriver`.
  ///
  /// Entries start at the platform directory (`linux-aarch64/debug/...`), so when this is empty
  /// they are relative to the driver's bin folder `<bin>/<driver>/`, not to the manifest's own folder.
  pub bin_location: String,
  /// Built targets, in the order their entries are written.
  pub targets: Vec<BuildTarget>,
  /// Runtime library file names per platform directory.
  pub dependencies: BTreeMap<String, Vec<String>>,
}

impl Manifest {
  pub fn new(driver_name: impl Into<String>, binding_library: impl Into<String>) -> Self {
    Self {
      driver_name: driver_name.into(),
      binding_library: binding_library.into(),
      configuration: Configuration::default(),
      bin_location: String::new(),
      targets: Vec::new(),
      dependencies: BTreeMap::new(),
    }
  }

  /// Manifest describing everything a build run produced.
  pub fn from_build(options: &BuildOptions, report: &BuildReport, configuration: Configuration) -> Self {
    Self {
      configuration,
      targets: report.targets.clone(),
      dependencies: report.dependencies.clone(),
      ..Self::new(&options.driver_name, &options.binding_library)
    }
  }

  pub fn with_bin_location(mut self, bin_location: impl Into<String>) -> Self {
    self.bin_location = bin_location.into();
    self
  }

  /// Path of `file` inside `target`'s output directory, as written in the manifest.
  fn entry_path(&self, target: &BuildTarget, file: &str) -> String {
    let relative = format!("{}/{}", target.relative_dir(), file);
    let prefix = self.bin_location.trim_end_matches('/');
    if prefix.is_empty() {
      relative
    } else {
      format!("{prefix}/{relative}")
    }
  }

  pub fn to_document(&self) -> Document {
    let mut libraries = Properties::new();
    let mut dependencies = Properties::new();

    for target in &self.targets {
      let label = target.label();
      let names = target
        .platform
        .main_library_names(&self.driver_name, &self.binding_library);

      libraries.insert(label.as_str(), self.entry_path(target, &names.driver));

      let mut deps = Properties::new();
      deps.insert(self.entry_path(target, &names.binding), "");
      if let Some(runtime) = self.dependencies.get(&target.directory()) {
        for library in runtime {
          deps.insert(self.entry_path(target, library), "");
        }
      }
      dependencies.insert(label, deps);
    }

    let mut document = Document::new();
    document.insert(CONFIGURATION_SECTION, self.configuration.to_properties());
    document.insert(LIBRARIES_SECTION, libraries);
    document.insert(DEPENDENCIES_SECTION, dependencies);
    document
  }

  pub fn encode(&self, encoder: &Encoder) -> Result<String, ManifestError> {
    Ok(encoder.encode(&self.to_document())?)
  }

  /// Encode and write the manifest to `path`, creating its folder if needed.
  pub fn write<F: FileOps>(&self, fs: &F, path: &Path) -> Result<(), ManifestError> {
    let text = self.encode(&Encoder::default())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      if !fs.file_exists(parent) {
        fs.create_directory(parent, true).map_err(|source| ManifestError::Write {
          path: parent.to_path_buf(),
          source,
        })?;
      }
    }

    fs.write_text_file(path, &text).map_err(|source| ManifestError::Write {
      path: path.to_path_buf(),
      source,
    })?;
    info!(path = %path.display(), targets = self.targets.len(), "wrote manifest");
    Ok(())
  }
}
