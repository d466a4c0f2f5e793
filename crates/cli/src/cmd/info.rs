use anyhow::Result;

use gdpack_lib::execute::Shell;
use gdpack_lib::fs::RealFs;
use gdpack_lib::platform::paths::home_dir;
use gdpack_lib::platform::{Arch, Platform};

use crate::output::{print_json, print_stat};

pub fn cmd_info(json: bool) -> Result<()> {
  let platform = Platform::current().map(|p| p.id().to_string()).ok();
  let arch = Arch::current().map(|a| a.as_str().to_string());
  let shell = Shell::detect(&RealFs).ok().map(|s| s.program.display().to_string());
  let home = home_dir().map(|h| h.display().to_string());

  if json {
    return print_json(&serde_json::json!({
      "version": env!("CARGO_PKG_VERSION"),
      "platform": platform,
      "arch": arch,
      "shell": shell,
      "home": home,
    }));
  }

  let unknown = || "unknown".to_string();
  println!("gdpack v{}", env!("CARGO_PKG_VERSION"));
  print_stat("Platform", &platform.unwrap_or_else(unknown));
  print_stat("Arch", &arch.unwrap_or_else(unknown));
  print_stat("Shell", &shell.unwrap_or_else(unknown));
  print_stat("Home", &home.unwrap_or_else(unknown));
  Ok(())
}
