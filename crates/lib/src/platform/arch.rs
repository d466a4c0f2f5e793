use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::platform::UnknownValue;

/// CPU architecture variants a driver can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
  X86_64,
  Aarch64,
}

impl Arch {
  pub const ALL: [Arch; 2] = [Arch::Aarch64, Arch::X86_64];

  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86_64" => Some(Self::X86_64),
      "aarch64" => Some(Self::Aarch64),
      _ => None,
    }
  }

  /// Toolchain identifier, also used in output directory names (`linux-aarch64`)
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
    }
  }

  /// Engine-facing name, used in manifest target labels (`linux.debug.arm64`)
  pub fn alias(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "arm64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Arch {
  type Err = UnknownValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "x86_64" | "amd64" => Ok(Self::X86_64),
      "aarch64" | "arm64" => Ok(Self::Aarch64),
      _ => Err(UnknownValue::new("architecture", s, "x86_64, aarch64")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn aarch64_alias_is_arm64() {
    assert_eq!(Arch::Aarch64.alias(), "arm64");
    assert_eq!(Arch::X86_64.alias(), "x86_64");
  }

  #[test]
  fn parse_accepts_aliases() {
    assert_eq!("arm64".parse::<Arch>().unwrap(), Arch::Aarch64);
    assert_eq!("AARCH64".parse::<Arch>().unwrap(), Arch::Aarch64);
    assert_eq!("x86_64".parse::<Arch>().unwrap(), Arch::X86_64);
    assert!("riscv64".parse::<Arch>().is_err());
  }
}
