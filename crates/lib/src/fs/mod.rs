//! File-system capability.
//!
//! The build orchestrator and the platform descriptors never touch the disk
//! directly. Everything goes through [`FileOps`], so the whole pipeline can be
//! driven against an in-memory tree in tests.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

/// File operations consumed by the build pipeline.
///
/// Paths are absolute. Text is always UTF-8.
pub trait FileOps {
  /// Returns true if a file or directory exists at `path`.
  fn file_exists(&self, path: &Path) -> bool;

  /// Creates a directory, including missing parents when `recursive` is set.
  fn create_directory(&self, path: &Path, recursive: bool) -> io::Result<()>;

  /// Copies `src` to `dst`. Directories (e.g. `.framework` bundles) are copied recursively.
  fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()>;

  /// Removes the file or directory tree at `path`.
  fn remove_file(&self, path: &Path) -> io::Result<()>;

  /// Lists the entry names directly inside `path`, sorted by name.
  fn list_directory(&self, path: &Path) -> io::Result<Vec<String>>;

  fn read_text_file(&self, path: &Path) -> io::Result<String>;

  fn write_text_file(&self, path: &Path, text: &str) -> io::Result<()>;
}

/// [`FileOps`] backed by the real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FileOps for RealFs {
  fn file_exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn create_directory(&self, path: &Path, recursive: bool) -> io::Result<()> {
    if recursive {
      fs::create_dir_all(path)
    } else {
      fs::create_dir(path)
    }
  }

  fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()> {
    if !src.is_dir() {
      fs::copy(src, dst)?;
      return Ok(());
    }

    debug!(src = ?src, dst = ?dst, "copying directory tree");
    for entry in WalkDir::new(src).sort_by_file_name() {
      let entry = entry.map_err(io::Error::other)?;
      let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
      let target = dst.join(relative);

      if entry.file_type().is_dir() {
        fs::create_dir_all(&target)?;
      } else if entry.file_type().is_symlink() {
        copy_symlink(entry.path(), &target)?;
      } else {
        fs::copy(entry.path(), &target)?;
      }
    }
    Ok(())
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
      fs::remove_dir_all(path)
    } else {
      fs::remove_file(path)
    }
  }

  fn list_directory(&self, path: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(path)? {
      names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
  }

  fn read_text_file(&self, path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
  }

  fn write_text_file(&self, path: &Path, text: &str) -> io::Result<()> {
    fs::write(path, text)
  }
}

// Framework bundles keep `Versions/Current`-style links; preserve them as links.
#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  let link = fs::read_link(src)?;
  std::os::unix::fs::symlink(link, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  fs::copy(src, dst).map(|_| ())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn copy_plain_file() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("libDriver.so");
    let dst = temp.path().join("out.so");
    std::fs::write(&src, b"elf").unwrap();

    RealFs.copy_file(&src, &dst).unwrap();

    assert_eq!(std::fs::read(&dst).unwrap(), b"elf");
  }

  #[test]
  fn copy_directory_bundle_recursively() {
    let temp = TempDir::new().unwrap();
    let bundle = temp.path().join("Driver.framework");
    std::fs::create_dir_all(bundle.join("Headers")).unwrap();
    std::fs::write(bundle.join("Driver"), b"macho").unwrap();
    std::fs::write(bundle.join("Headers").join("Driver.h"), b"// header").unwrap();

    let dst = temp.path().join("copy").join("Driver.framework");
    RealFs.create_directory(dst.parent().unwrap(), true).unwrap();
    RealFs.copy_file(&bundle, &dst).unwrap();

    assert!(dst.join("Driver").exists());
    assert_eq!(std::fs::read(dst.join("Headers").join("Driver.h")).unwrap(), b"// header");
  }

  #[test]
  fn remove_handles_files_and_directories() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.dll");
    let dir = temp.path().join("b.framework");
    std::fs::write(&file, b"").unwrap();
    std::fs::create_dir_all(dir.join("nested")).unwrap();

    RealFs.remove_file(&file).unwrap();
    RealFs.remove_file(&dir).unwrap();

    assert!(!RealFs.file_exists(&file));
    assert!(!RealFs.file_exists(&dir));
  }

  #[test]
  fn list_directory_is_sorted() {
    let temp = TempDir::new().unwrap();
    for name in ["c.so", "a.so", "b.so"] {
      std::fs::write(temp.path().join(name), b"").unwrap();
    }

    let names = RealFs.list_directory(temp.path()).unwrap();

    assert_eq!(names, vec!["a.so", "b.so", "c.so"]);
  }

  #[test]
  fn non_recursive_create_fails_without_parent() {
    let temp = TempDir::new().unwrap();
    let deep = temp.path().join("x").join("y");

    assert!(RealFs.create_directory(&deep, false).is_err());
    RealFs.create_directory(&deep, true).unwrap();
    assert!(deep.is_dir());
  }
}
