use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::platform::UnknownValue;

/// Build configuration passed to the toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
  Debug,
  Release,
}

impl BuildMode {
  pub const ALL: [BuildMode; 2] = [BuildMode::Debug, BuildMode::Release];

  /// Lowercase identifier, used for `--configuration` and output directory names
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debug => "debug",
      Self::Release => "release",
    }
  }

  /// Capitalized configuration name expected by Xcode
  pub fn xcode_name(&self) -> &'static str {
    match self {
      Self::Debug => "Debug",
      Self::Release => "Release",
    }
  }
}

impl fmt::Display for BuildMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for BuildMode {
  type Err = UnknownValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "debug" => Ok(Self::Debug),
      "release" => Ok(Self::Release),
      _ => Err(UnknownValue::new("build mode", s, "debug, release")),
    }
  }
}
