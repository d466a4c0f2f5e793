use std::path::PathBuf;

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("USERPROFILE").map(PathBuf::from)
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME").map(PathBuf::from)
}

/// Keeps only ASCII letters and digits, e.g. to derive a package name from a project folder.
pub fn alphanumerics(name: &str) -> String {
  name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
