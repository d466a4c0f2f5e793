//! Value model of the section format.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A scalar or map value of a heading property or section entry.
#[derive(Debug, Clone)]
pub enum Value {
  String(String),
  Bool(bool),
  Int(i64),
  Float(f64),
  /// Ordered sub-map, used for dependency entries.
  Map(Properties),
}

impl Value {
  pub fn kind(&self) -> &'static str {
    match self {
      Value::String(_) => "string",
      Value::Bool(_) => "bool",
      Value::Int(_) => "int",
      Value::Float(_) => "float",
      Value::Map(_) => "map",
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_map(&self) -> Option<&Properties> {
    match self {
      Value::Map(map) => Some(map),
      _ => None,
    }
  }
}

// Floats compare by bit pattern so that `Eq` and `Hash` agree.
impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::String(a), Value::String(b)) => a == b,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Int(a), Value::Int(b)) => a == b,
      (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
      (Value::Map(a), Value::Map(b)) => a == b,
      _ => false,
    }
  }
}

impl Eq for Value {}

impl Hash for Value {
  fn hash<H: Hasher>(&self, state: &mut H) {
    std::mem::discriminant(self).hash(state);
    match self {
      Value::String(s) => s.hash(state),
      Value::Bool(b) => b.hash(state),
      Value::Int(i) => i.hash(state),
      Value::Float(f) => f.to_bits().hash(state),
      Value::Map(map) => map.hash(state),
    }
  }
}

impl Serialize for Value {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Value::String(s) => serializer.serialize_str(s),
      Value::Bool(b) => serializer.serialize_bool(*b),
      Value::Int(i) => serializer.serialize_i64(*i),
      Value::Float(f) => serializer.serialize_f64(*f),
      Value::Map(map) => map.serialize(serializer),
    }
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::String(value.to_string())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::String(value)
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Value::Int(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Float(value)
  }
}

impl From<Properties> for Value {
  fn from(value: Properties) -> Self {
    Value::Map(value)
  }
}

/// Insertion-ordered key/value mapping.
///
/// Equality is order-sensitive: two bodies with the same entries in a
/// different order render differently and are not equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Properties {
  entries: Vec<(String, Value)>,
}

impl Properties {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set `key`, replacing an existing value in place so its position is kept.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    let key = key.into();
    let value = value.into();
    match self.entries.iter_mut().find(|(k, _)| *k == key) {
      Some((_, slot)) => Some(std::mem::replace(slot, value)),
      None => {
        self.entries.push((key, value));
        None
      }
    }
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.get(key).is_some()
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(k, _)| k.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
  K: Into<String>,
  V: Into<Value>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut properties = Properties::new();
    for (key, value) in iter {
      properties.insert(key, value);
    }
    properties
  }
}

impl Serialize for Properties {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.len()))?;
    for (key, value) in self.iter() {
      map.serialize_entry(key, value)?;
    }
    map.end()
  }
}

/// Section heading: a name plus optional properties.
///
/// Two headings are equal when their names match and their properties hold
/// the same key/value pairs, whatever order the properties were declared in.
#[derive(Debug, Clone, Serialize)]
pub struct Heading {
  pub name: String,
  pub properties: Properties,
}

impl Heading {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      properties: Properties::new(),
    }
  }

  pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.properties.insert(key, value);
    self
  }
}

impl PartialEq for Heading {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
      && self.properties.len() == other.properties.len()
      && self
        .properties
        .iter()
        .all(|(key, value)| other.properties.get(key) == Some(value))
  }
}

impl Eq for Heading {}

impl Hash for Heading {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name.hash(state);
    let mut sorted: Vec<(&str, &Value)> = self.properties.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in sorted {
      key.hash(state);
      value.hash(state);
    }
  }
}

impl From<&str> for Heading {
  fn from(name: &str) -> Self {
    Heading::new(name)
  }
}

impl fmt::Display for Heading {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

/// One `[heading]` and the entries below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
  pub heading: Heading,
  pub entries: Properties,
}

/// Ordered sequence of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Document {
  sections: Vec<Section>,
}

impl Document {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a section, or replace the entries of an equal heading in place.
  pub fn insert(&mut self, heading: impl Into<Heading>, entries: Properties) -> Option<Properties> {
    let heading = heading.into();
    match self.sections.iter_mut().find(|s| s.heading == heading) {
      Some(section) => Some(std::mem::replace(&mut section.entries, entries)),
      None => {
        self.sections.push(Section { heading, entries });
        None
      }
    }
  }

  pub fn get(&self, heading: &Heading) -> Option<&Properties> {
    self.sections.iter().find(|s| s.heading == *heading).map(|s| &s.entries)
  }

  /// Entries of the first section named `name`.
  pub fn section(&self, name: &str) -> Option<&Properties> {
    self.sections.iter().find(|s| s.heading.name == name).map(|s| &s.entries)
  }

  pub fn sections(&self) -> &[Section] {
    &self.sections
  }

  pub fn len(&self) -> usize {
    self.sections.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sections.is_empty()
  }
}
