//! Test doubles for the file-system and command-runner capabilities.
//!
//! [`MemoryFs`] keeps a whole tree in memory and [`ScriptedRunner`] replays
//! canned command results, so build cycles can be exercised without a
//! toolchain or a disk.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::build::CycleContext;
use crate::execute::{CommandRunner, ExecuteError};
use crate::fs::FileOps;
use crate::platform::{Arch, BuildMode};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
  pub files: BTreeMap<PathBuf, String>,
  pub dirs: BTreeSet<PathBuf>,
}

impl Tree {
  fn add_parents(&mut self, path: &Path) {
    for ancestor in path.ancestors().skip(1) {
      if ancestor.as_os_str().is_empty() {
        break;
      }
      self.dirs.insert(ancestor.to_path_buf());
    }
  }
}

/// In-memory [`FileOps`]. Clones share one tree.
#[derive(Debug, Default, Clone)]
pub struct MemoryFs {
  tree: Arc<Mutex<Tree>>,
}

impl MemoryFs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a file, creating every missing parent directory.
  pub fn add_file(&self, path: &str, contents: &str) {
    let path = PathBuf::from(path);
    let mut tree = self.tree.lock().unwrap();
    tree.add_parents(&path);
    tree.files.insert(path, contents.to_string());
  }

  pub fn snapshot(&self) -> Tree {
    self.tree.lock().unwrap().clone()
  }
}

fn not_found(path: &Path) -> io::Error {
  io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
}

impl FileOps for MemoryFs {
  fn file_exists(&self, path: &Path) -> bool {
    let tree = self.tree.lock().unwrap();
    tree.files.contains_key(path) || tree.dirs.contains(path)
  }

  fn create_directory(&self, path: &Path, recursive: bool) -> io::Result<()> {
    let mut tree = self.tree.lock().unwrap();
    if recursive {
      tree.add_parents(path);
    } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      if !tree.dirs.contains(parent) && parent.parent().is_some() {
        return Err(not_found(parent));
      }
    }
    tree.dirs.insert(path.to_path_buf());
    Ok(())
  }

  fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()> {
    let mut tree = self.tree.lock().unwrap();
    if let Some(contents) = tree.files.get(src).cloned() {
      tree.files.insert(dst.to_path_buf(), contents);
      return Ok(());
    }
    if !tree.dirs.contains(src) {
      return Err(not_found(src));
    }

    let dirs: Vec<PathBuf> = tree.dirs.iter().filter(|d| d.starts_with(src)).cloned().collect();
    for dir in dirs {
      let relative = dir.strip_prefix(src).map_err(io::Error::other)?;
      tree.dirs.insert(dst.join(relative));
    }
    let files: Vec<(PathBuf, String)> = tree
      .files
      .iter()
      .filter(|(p, _)| p.starts_with(src))
      .map(|(p, c)| (p.clone(), c.clone()))
      .collect();
    for (file, contents) in files {
      let relative = file.strip_prefix(src).map_err(io::Error::other)?;
      tree.files.insert(dst.join(relative), contents);
    }
    Ok(())
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    let mut tree = self.tree.lock().unwrap();
    if !tree.files.contains_key(path) && !tree.dirs.contains(path) {
      return Err(not_found(path));
    }
    tree.files.retain(|p, _| !p.starts_with(path));
    tree.dirs.retain(|d| !d.starts_with(path));
    Ok(())
  }

  fn list_directory(&self, path: &Path) -> io::Result<Vec<String>> {
    let tree = self.tree.lock().unwrap();
    if !tree.dirs.contains(path) {
      return Err(not_found(path));
    }
    let names: BTreeSet<String> = tree
      .files
      .keys()
      .chain(tree.dirs.iter())
      .filter(|p| p.parent() == Some(path))
      .filter_map(|p| p.file_name())
      .map(|n| n.to_string_lossy().into_owned())
      .collect();
    Ok(names.into_iter().collect())
  }

  fn read_text_file(&self, path: &Path) -> io::Result<String> {
    self.tree.lock().unwrap().files.get(path).cloned().ok_or_else(|| not_found(path))
  }

  fn write_text_file(&self, path: &Path, text: &str) -> io::Result<()> {
    let mut tree = self.tree.lock().unwrap();
    if let Some(parent) = path.parent().filter(|p| p.parent().is_some()) {
      if !tree.dirs.contains(parent) {
        return Err(not_found(parent));
      }
    }
    tree.files.insert(path.to_path_buf(), text.to_string());
    Ok(())
  }
}

type Effect = Box<dyn Fn() + Send + Sync>;

struct Scripted {
  result: Result<String, i32>,
  /// Runs when the command is issued, standing in for what the tool writes to disk.
  effect: Option<Effect>,
}

/// [`CommandRunner`] replaying queued results in order.
///
/// Every command is recorded. An empty queue answers with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
  responses: Mutex<VecDeque<Scripted>>,
  commands: Mutex<Vec<String>>,
  discards: AtomicUsize,
}

impl ScriptedRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push_ok(&self, output: &str) {
    self.push(Ok(output.to_string()), None);
  }

  /// Answer with `output` after running `effect`.
  pub fn push_ok_then(&self, output: &str, effect: impl Fn() + Send + Sync + 'static) {
    self.push(Ok(output.to_string()), Some(Box::new(effect)));
  }

  pub fn push_err(&self, code: i32) {
    self.push(Err(code), None);
  }

  fn push(&self, result: Result<String, i32>, effect: Option<Effect>) {
    self.responses.lock().unwrap().push_back(Scripted { result, effect });
  }

  pub fn commands(&self) -> Vec<String> {
    self.commands.lock().unwrap().clone()
  }

  pub fn discards(&self) -> usize {
    self.discards.load(Ordering::SeqCst)
  }
}

impl CommandRunner for ScriptedRunner {
  async fn run(&self, command: &str) -> Result<String, ExecuteError> {
    self.commands.lock().unwrap().push(command.to_string());
    let Some(scripted) = self.responses.lock().unwrap().pop_front() else {
      return Ok(String::new());
    };
    if let Some(effect) = &scripted.effect {
      effect();
    }
    scripted.result.map_err(|code| ExecuteError::CmdFailed {
      cmd: command.to_string(),
      code: Some(code),
    })
  }

  fn discard_output(&self) {
    self.discards.fetch_add(1, Ordering::SeqCst);
  }
}

/// Cycle context for driver `GameDriver` with binding `SwiftGodot` and home `/home/dev`.
pub fn cycle_context<'a>(
  runner: &'a ScriptedRunner,
  fs: &'a MemoryFs,
  driver_path: &'a Path,
  mode: BuildMode,
  arch: Option<Arch>,
) -> CycleContext<'a, ScriptedRunner, MemoryFs> {
  CycleContext {
    runner,
    fs,
    driver_name: "GameDriver",
    binding: "SwiftGodot",
    driver_path,
    home_dir: Some(Path::new("/home/dev")),
    mode,
    arch,
    destination: PathBuf::from("/game/bin/GameDriver/test").join(mode.as_str()),
  }
}
