//! Implementation of the `gdpack inspect` command.

use std::path::Path;

use anyhow::{Context, Result};

use gdpack_lib::fs::{FileOps, RealFs};
use gdpack_lib::tscn::{Value, decode};

use crate::output::{print_info, print_json, print_stat, symbols};

pub fn cmd_inspect(path: &Path, verbose: bool, json: bool) -> Result<()> {
  let text = RealFs
    .read_text_file(path)
    .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
  let document = decode(&text).with_context(|| format!("Failed to parse manifest: {}", path.display()))?;

  if json {
    return print_json(&document);
  }

  if document.is_empty() {
    print_info("Manifest has no sections.");
    return Ok(());
  }

  for section in document.sections() {
    print_stat(&format!("[{}]", section.heading), &format!("{} entries", section.entries.len()));
    if !verbose {
      continue;
    }
    for (key, value) in section.entries.iter() {
      match value {
        Value::Map(map) => {
          println!("    {key}");
          for (entry, _) in map.iter() {
            println!("      {} {}", symbols::ARROW, entry);
          }
        }
        Value::String(s) => println!("    {key} = {s}"),
        other => println!("    {key} = {}", serde_json::to_string(other)?),
      }
    }
  }

  Ok(())
}
