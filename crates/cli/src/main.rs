mod cmd;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gdpack_lib::platform::{Arch, BuildMode, Platform};

use crate::output::print_error;

/// gdpack - build a native engine extension for every platform and write its manifest
#[derive(Parser)]
#[command(name = "gdpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,

  /// Arguments of the default `build` command, used when no subcommand is given
  #[command(flatten)]
  build: BuildArgs,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the driver for the requested targets and write the manifest (default)
  Build(BuildArgs),

  /// Print the sections and entries of an existing manifest
  Inspect {
    /// Path to the manifest file
    manifest: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Show host platform, architecture and toolchain shell
  Info {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
  /// Platforms to build for (default: the host platform)
  #[arg(short, long, num_args = 1.., value_delimiter = ',')]
  pub targets: Vec<Platform>,

  /// Project folder; the driver package lives in `<project-root>/<driver-name>`
  #[arg(short = 'C', long, default_value = ".")]
  pub project_root: PathBuf,

  /// Project name (default: the project folder's name)
  #[arg(short, long)]
  pub project_name: Option<String>,

  /// Driver package name (default: project name alphanumerics + "Driver")
  #[arg(short, long)]
  pub driver_name: Option<String>,

  /// Build modes (default: debug)
  #[arg(short = 'c', long = "configuration", num_args = 1.., value_delimiter = ',')]
  pub modes: Vec<BuildMode>,

  /// Architectures (default: the host architecture)
  #[arg(short, long, num_args = 1.., value_delimiter = ',')]
  pub arch: Vec<Arch>,

  /// Folder under the project root receiving binaries and the manifest
  #[arg(long)]
  pub bin_folder: Option<String>,

  /// Prefix for library paths written to the manifest, e.g. `res://bin/GameDriver`
  #[arg(long, default_value = "")]
  pub bin_location: String,

  /// Mark the extension as hot-reloadable
  #[arg(long)]
  pub reloadable: bool,

  /// Oldest compatible engine version
  #[arg(long)]
  pub compatibility_minimum: Option<f64>,

  /// Newest compatible engine version
  #[arg(long)]
  pub compatibility_maximum: Option<f64>,

  /// Shell used to run toolchain commands (default: zsh or sh, cmd.exe on Windows)
  #[arg(long)]
  pub shell: Option<String>,

  /// Do not echo toolchain output
  #[arg(short, long)]
  pub quiet: bool,

  /// Output the build report as JSON
  #[arg(long)]
  pub json: bool,
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "info" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Some(Commands::Build(args)) => cmd::cmd_build(args, cli.verbose),
    Some(Commands::Inspect { manifest, json }) => cmd::cmd_inspect(&manifest, cli.verbose, json),
    Some(Commands::Info { json }) => cmd::cmd_info(json),
    None => cmd::cmd_build(cli.build, cli.verbose),
  };

  if let Err(err) = result {
    print_error(&format!("{err:#}"));
    std::process::exit(1);
  }
}
