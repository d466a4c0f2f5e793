//! Implementation of the `gdpack build` command.
//!
//! Resolves defaults for everything not given on the command line, checks the
//! requested targets against the host, runs the build matrix and writes the
//! manifest next to the binaries.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow, bail};
use tracing::info;

use gdpack_lib::build::{BuildOptions, Builder};
use gdpack_lib::consts::DEFAULT_BIN_FOLDER;
use gdpack_lib::execute::{OutputObserver, Shell, ShellRunner, Silent, StdoutEcho};
use gdpack_lib::fs::RealFs;
use gdpack_lib::manifest::{Configuration, Manifest};
use gdpack_lib::platform::paths::{alphanumerics, home_dir};
use gdpack_lib::platform::{Arch, BuildMode, Platform, validate_targets};

use crate::BuildArgs;
use crate::output::{format_duration, print_json, print_stat, print_success, symbols};

pub fn cmd_build(args: BuildArgs, verbose: bool) -> Result<()> {
  let root = dunce::canonicalize(&args.project_root)
    .with_context(|| format!("Project folder not found: {}", args.project_root.display()))?;

  let host = Platform::current()?;
  let targets = if args.targets.is_empty() { vec![host] } else { args.targets.clone() };
  validate_targets(host, &targets)?;

  let archs = if args.arch.is_empty() {
    vec![Arch::current().ok_or_else(|| anyhow!("Unsupported host architecture: {}", std::env::consts::ARCH))?]
  } else {
    args.arch.clone()
  };
  let modes = if args.modes.is_empty() { vec![BuildMode::Debug] } else { args.modes.clone() };

  let project_name = match &args.project_name {
    Some(name) => name.clone(),
    None => project_name_from(&root)?,
  };
  let driver_name = match &args.driver_name {
    Some(name) => name.clone(),
    None => default_driver_name(&project_name)?,
  };

  let shell = match &args.shell {
    Some(shell) => Shell::from_override(shell),
    None => Shell::detect(&RealFs)?,
  };
  let observer: Arc<dyn OutputObserver> = if args.quiet || args.json { Arc::new(Silent) } else { Arc::new(StdoutEcho) };
  let runner = ShellRunner::new(shell, observer);

  let mut options = BuildOptions::new(&root, &driver_name);
  options.bin_folder = args.bin_folder.clone().unwrap_or_else(|| DEFAULT_BIN_FOLDER.to_string());
  options.home_dir = home_dir();
  options.platforms = targets;
  options.archs = archs;
  options.modes = modes;

  info!(project = %project_name, driver = %driver_name, root = %root.display(), "resolved build options");

  let started = Instant::now();
  let mut builder = Builder::new(runner, RealFs, options);
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(builder.build_all()).context("Build failed")?;

  let options = builder.options();
  let manifest = Manifest::from_build(options, &report, configuration(&args)).with_bin_location(&args.bin_location);
  let manifest_path = options.manifest_path();
  manifest
    .write(&RealFs, &manifest_path)
    .with_context(|| format!("Failed to write manifest: {}", manifest_path.display()))?;

  if args.json {
    let json_output = serde_json::json!({
      "driver": driver_name,
      "manifest": manifest_path,
      "targets": report.targets,
      "dependencies": report.dependencies,
    });
    return print_json(&json_output);
  }

  println!();
  print_success(&format!(
    "Built {} target(s) in {}",
    report.targets.len(),
    format_duration(started.elapsed())
  ));
  for target in &report.targets {
    println!("  {} {} {}", symbols::INFO, target.label(), options.destination_dir(target).display());
    if verbose {
      for library in report.dependencies_for(target) {
        println!("      {} {}", symbols::ARROW, library);
      }
    }
  }
  println!();
  print_stat("Manifest", &manifest_path.display().to_string());

  Ok(())
}

fn configuration(args: &BuildArgs) -> Configuration {
  let mut config = Configuration::default();
  if let Some(min) = args.compatibility_minimum {
    config.compatibility_minimum = min;
  }
  config.compatibility_maximum = args.compatibility_maximum;
  if args.reloadable {
    config.reloadable = Some(true);
  }
  config
}

fn project_name_from(root: &Path) -> Result<String> {
  root
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .ok_or_else(|| anyhow!("Cannot derive a project name from {}", root.display()))
}

/// `my-game` becomes `mygameDriver`.
fn default_driver_name(project_name: &str) -> Result<String> {
  let stem = alphanumerics(project_name);
  if stem.is_empty() {
    bail!("Project name '{project_name}' has no letters or digits; pass --driver-name");
  }
  Ok(format!("{stem}Driver"))
}
