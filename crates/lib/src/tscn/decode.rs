//! Text to document.
//!
//! Reads what [`crate::tscn::Encoder`] writes, plus blank lines and `;` comments.

use thiserror::Error;

use crate::tscn::{Document, Heading, Properties, Value};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
  #[error("line {line}: malformed heading")]
  InvalidHeading { line: usize },

  #[error("line {line}: expected `key = value`")]
  InvalidEntry { line: usize },

  #[error("line {line}: entry before the first heading")]
  EntryOutsideSection { line: usize },

  #[error("line {line}: invalid value: {message}")]
  InvalidValue { line: usize, message: String },
}

pub fn decode(text: &str) -> Result<Document, DecodeError> {
  let mut document = Document::new();
  let mut current: Option<(Heading, Properties)> = None;

  for (index, raw) in text.lines().enumerate() {
    let line = index + 1;
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with(';') {
      continue;
    }

    if trimmed.starts_with('[') {
      if let Some((heading, entries)) = current.take() {
        document.insert(heading, entries);
      }
      current = Some((parse_heading(trimmed, line)?, Properties::new()));
      continue;
    }

    let Some((_, entries)) = current.as_mut() else {
      return Err(DecodeError::EntryOutsideSection { line });
    };
    let (key, rest) = trimmed.split_once('=').ok_or(DecodeError::InvalidEntry { line })?;
    let key = key.trim();
    if key.is_empty() {
      return Err(DecodeError::InvalidEntry { line });
    }

    let mut cursor = Cursor::new(rest, line);
    let value = cursor.value()?;
    cursor.finish()?;
    entries.insert(key, value);
  }

  if let Some((heading, entries)) = current {
    document.insert(heading, entries);
  }
  Ok(document)
}

fn parse_heading(text: &str, line: usize) -> Result<Heading, DecodeError> {
  let inner = text
    .strip_prefix('[')
    .and_then(|t| t.strip_suffix(']'))
    .ok_or(DecodeError::InvalidHeading { line })?
    .trim();

  let (name, rest) = match inner.split_once(char::is_whitespace) {
    Some((name, rest)) => (name, rest),
    None => (inner, ""),
  };
  if name.is_empty() {
    return Err(DecodeError::InvalidHeading { line });
  }

  let mut heading = Heading::new(name);
  let mut cursor = Cursor::new(rest, line);
  cursor.skip_ws();
  while !cursor.at_end() {
    let key = cursor.take_while(|c| c != '=' && !c.is_whitespace());
    cursor.skip_ws();
    if key.is_empty() || !cursor.eat('=') {
      return Err(DecodeError::InvalidHeading { line });
    }
    cursor.skip_ws();
    let value = cursor.value()?;
    heading.properties.insert(key, value);
    cursor.skip_ws();
    if !cursor.eat(',') && !cursor.at_end() {
      return Err(DecodeError::InvalidHeading { line });
    }
    cursor.skip_ws();
  }
  Ok(heading)
}

/// Single-line value reader.
struct Cursor<'a> {
  text: &'a str,
  pos: usize,
  line: usize,
}

impl<'a> Cursor<'a> {
  fn new(text: &'a str, line: usize) -> Self {
    Self { text, pos: 0, line }
  }

  fn rest(&self) -> &'a str {
    &self.text[self.pos..]
  }

  fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  fn at_end(&self) -> bool {
    self.pos >= self.text.len()
  }

  fn eat(&mut self, c: char) -> bool {
    if self.peek() == Some(c) {
      self.pos += c.len_utf8();
      true
    } else {
      false
    }
  }

  fn skip_ws(&mut self) {
    self.take_while(char::is_whitespace);
  }

  fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
    let start = self.pos;
    let len = self.rest().find(|c: char| !pred(c)).unwrap_or(self.rest().len());
    self.pos += len;
    &self.text[start..self.pos]
  }

  fn error(&self, message: impl Into<String>) -> DecodeError {
    DecodeError::InvalidValue {
      line: self.line,
      message: message.into(),
    }
  }

  /// Only trailing whitespace may follow the value.
  fn finish(&mut self) -> Result<(), DecodeError> {
    self.skip_ws();
    if self.at_end() {
      Ok(())
    } else {
      Err(self.error(format!("unexpected trailing text `{}`", self.rest())))
    }
  }

  fn value(&mut self) -> Result<Value, DecodeError> {
    self.skip_ws();
    match self.peek() {
      Some('"') => self.string().map(Value::String),
      Some('{') => self.map().map(Value::Map),
      Some(_) => self.bare(),
      None => Err(self.error("missing value")),
    }
  }

  fn string(&mut self) -> Result<String, DecodeError> {
    let start = self.pos;
    let mut escaped = false;
    for (offset, c) in self.rest().char_indices().skip(1) {
      match c {
        '\\' if !escaped => escaped = true,
        '"' if !escaped => {
          let end = self.pos + offset + 1;
          let literal = &self.text[start..end];
          self.pos = end;
          return serde_json::from_str(literal).map_err(|e| self.error(e.to_string()));
        }
        _ => escaped = false,
      }
    }
    Err(self.error("unterminated string"))
  }

  fn map(&mut self) -> Result<Properties, DecodeError> {
    self.eat('{');
    let mut map = Properties::new();
    self.skip_ws();
    if self.eat('}') {
      return Ok(map);
    }
    loop {
      self.skip_ws();
      if self.peek() != Some('"') {
        return Err(self.error("map keys must be quoted strings"));
      }
      let key = self.string()?;
      self.skip_ws();
      if !self.eat(':') {
        return Err(self.error("expected `:` after map key"));
      }
      let value = self.value()?;
      if matches!(value, Value::Map(_)) {
        return Err(self.error("nested maps are not supported"));
      }
      map.insert(key, value);
      self.skip_ws();
      if self.eat('}') {
        return Ok(map);
      }
      if !self.eat(',') {
        return Err(self.error("expected `,` or `}` in map"));
      }
    }
  }

  fn bare(&mut self) -> Result<Value, DecodeError> {
    let token = self.take_while(|c| !c.is_whitespace() && !matches!(c, ',' | '}' | ']'));
    match token {
      "true" => Ok(Value::Bool(true)),
      "false" => Ok(Value::Bool(false)),
      _ if token.contains(['.', 'e', 'E']) => token
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| self.error(format!("invalid float `{token}`"))),
      _ => token
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|_| self.error(format!("unrecognized value `{token}`"))),
    }
  }
}
