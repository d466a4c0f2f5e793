use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::consts::{DEFAULT_COMPATIBILITY_MINIMUM, DEFAULT_ENTRY_SYMBOL};
use crate::tscn::{EncodeError, Properties};

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to encode manifest: {0}")]
  Encode(#[from] EncodeError),

  #[error("failed to write manifest {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Global `[configuration]` section of the manifest.
///
/// Unset optional fields are left out of the output entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
  /// Name of the function the engine calls to initialize the extension.
  pub entry_symbol: String,
  /// Oldest engine version the extension loads in.
  pub compatibility_minimum: f64,
  pub compatibility_maximum: Option<f64>,
  /// Whether the engine may hot-reload the extension after a rebuild.
  pub reloadable: Option<bool>,
  /// Whether the extension is part of an Android AAR plugin.
  pub android_aar_plugin: Option<bool>,
}

impl Default for Configuration {
  fn default() -> Self {
    Self {
      entry_symbol: DEFAULT_ENTRY_SYMBOL.to_string(),
      compatibility_minimum: DEFAULT_COMPATIBILITY_MINIMUM,
      compatibility_maximum: None,
      reloadable: None,
      android_aar_plugin: None,
    }
  }
}

impl Configuration {
  pub fn to_properties(&self) -> Properties {
    let mut props = Properties::new();
    props.insert("entry_symbol", self.entry_symbol.as_str());
    props.insert("compatibility_minimum", self.compatibility_minimum);
    if let Some(max) = self.compatibility_maximum {
      props.insert("compatibility_maximum", max);
    }
    if let Some(reloadable) = self.reloadable {
      props.insert("reloadable", reloadable);
    }
    if let Some(aar) = self.android_aar_plugin {
      props.insert("android_aar_plugin", aar);
    }
    props
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tscn::Value;

  #[test]
  fn default_configuration_omits_unset_fields() {
    let props = Configuration::default().to_properties();

    assert_eq!(
      props.keys().collect::<Vec<_>>(),
      vec!["entry_symbol", "compatibility_minimum"]
    );
    assert_eq!(props.get("compatibility_minimum"), Some(&Value::Float(4.2)));
  }

  #[test]
  fn set_fields_follow_declaration_order() {
    let config = Configuration {
      compatibility_maximum: Some(4.4),
      reloadable: Some(true),
      android_aar_plugin: Some(false),
      ..Configuration::default()
    };

    assert_eq!(
      config.to_properties().keys().collect::<Vec<_>>(),
      vec![
        "entry_symbol",
        "compatibility_minimum",
        "compatibility_maximum",
        "reloadable",
        "android_aar_plugin"
      ]
    );
  }
}
