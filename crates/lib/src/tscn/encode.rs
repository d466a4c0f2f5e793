//! Document to text.

use thiserror::Error;

use crate::tscn::{Document, Heading, Properties, Value};

/// A value or key that has no textual form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
  #[error("cannot encode non-finite float for key '{key}'")]
  NonFiniteFloat { key: String },

  #[error("cannot encode map nested inside map value for key '{key}'")]
  NestedMap { key: String },

  #[error("invalid key or heading name '{key}'")]
  InvalidKey { key: String },

  #[error("failed to quote string for key '{key}': {message}")]
  Quote { key: String, message: String },
}

/// Renders a [`Document`] as `[heading]` / `key = value` text.
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
  /// Emit a blank line after every section.
  pub separate_sections: bool,
}

impl Default for Encoder {
  fn default() -> Self {
    Self {
      separate_sections: true,
    }
  }
}

impl Encoder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn encode(&self, document: &Document) -> Result<String, EncodeError> {
    let mut out = String::new();
    for section in document.sections() {
      out.push_str(&encode_heading(&section.heading)?);
      out.push('\n');
      for (key, value) in section.entries.iter() {
        check_key(key)?;
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(&encode_value(key, value)?);
        out.push('\n');
      }
      if self.separate_sections {
        out.push('\n');
      }
    }
    Ok(out)
  }
}

/// Encode with default settings.
pub fn encode(document: &Document) -> Result<String, EncodeError> {
  Encoder::default().encode(document)
}

fn encode_heading(heading: &Heading) -> Result<String, EncodeError> {
  check_key(&heading.name)?;
  if heading.properties.is_empty() {
    return Ok(format!("[{}]", heading.name));
  }

  let mut parts = Vec::with_capacity(heading.properties.len());
  for (key, value) in heading.properties.iter() {
    check_key(key)?;
    parts.push(format!("{}={}", key, encode_value(key, value)?));
  }
  Ok(format!("[{} {}]", heading.name, parts.join(", ")))
}

/// Keys are written bare, so they must not contain anything the line syntax gives meaning to.
fn check_key(key: &str) -> Result<(), EncodeError> {
  let invalid = key.is_empty()
    || key
      .chars()
      .any(|c| c.is_whitespace() || matches!(c, '=' | '[' | ']' | '"' | ',' | ';' | '{' | '}'));
  if invalid {
    return Err(EncodeError::InvalidKey { key: key.to_string() });
  }
  Ok(())
}

fn encode_value(key: &str, value: &Value) -> Result<String, EncodeError> {
  match value {
    Value::Map(map) => encode_map(key, map),
    scalar => encode_scalar(key, scalar),
  }
}

fn encode_map(key: &str, map: &Properties) -> Result<String, EncodeError> {
  let mut parts = Vec::with_capacity(map.len());
  for (entry_key, value) in map.iter() {
    if matches!(value, Value::Map(_)) {
      return Err(EncodeError::NestedMap { key: key.to_string() });
    }
    parts.push(format!("{}: {}", quote(key, entry_key)?, encode_scalar(key, value)?));
  }
  Ok(format!("{{{}}}", parts.join(", ")))
}

fn encode_scalar(key: &str, value: &Value) -> Result<String, EncodeError> {
  match value {
    Value::String(s) => quote(key, s),
    Value::Bool(b) => Ok(b.to_string()),
    Value::Int(i) => Ok(i.to_string()),
    // Debug keeps a fractional part on whole numbers (`4.0`), so floats stay floats when read back.
    Value::Float(f) if f.is_finite() => Ok(format!("{f:?}")),
    Value::Float(_) => Err(EncodeError::NonFiniteFloat { key: key.to_string() }),
    Value::Map(_) => Err(EncodeError::NestedMap { key: key.to_string() }),
  }
}

fn quote(key: &str, s: &str) -> Result<String, EncodeError> {
  serde_json::to_string(s).map_err(|e| EncodeError::Quote {
    key: key.to_string(),
    message: e.to_string(),
  })
}
