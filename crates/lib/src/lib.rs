//! gdpack-lib: build orchestration and manifest generation for native engine extensions
//!
//! This crate provides the pieces the `gdpack` CLI wires together:
//! - `execute`: runs toolchain commands through the host shell and captures their output
//! - `platform`: per-platform naming rules, build procedures and runtime discovery
//! - `build`: walks the (mode, platform, architecture) matrix and lays out the binaries
//! - `manifest`: turns a build run into the engine's `.gdextension` manifest
//! - `tscn`: the ordered section text format the manifest is written in

pub mod build;
pub mod consts;
pub mod execute;
pub mod fs;
pub mod manifest;
pub mod platform;
pub mod tscn;
pub mod util;
