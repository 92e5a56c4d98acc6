//! Graph configuration
//!
//! Every knob has a default, so `GraphConfig::default()` is what most callers
//! want. Teams that need a different id prefix or root layer name keep a
//! versioned YAML file:
//!
//! ```yaml
//! version: 1
//! ids:
//!   prefix: "+"
//! decode:
//!   max_depth: 64
//! conventions:
//!   root: transcript
//!   word: word
//! ```
//!
//! The core never reads environment variables; configuration is always passed
//! explicitly (`Graph::with_config`, `Graph::from_serialized_with`).

pub mod error;
pub mod io;

pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, CONFIG_VERSION};

use crate::features::codec::document::is_reserved_layer_id;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound accepted for `decode.max_depth`
pub const MAX_DECODE_DEPTH: usize = 4096;

/// Generated id settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdConfig {
    /// Prefix of generated anchor/annotation ids ("+" gives "+1", "+2", ...)
    pub prefix: String,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            prefix: "+".to_string(),
        }
    }
}

/// Decode limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    /// Maximum annotation nesting depth (1..=4096)
    pub max_depth: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Well-known layer ids
///
/// Only `root` affects decoding (it names the schema entry holding the layer
/// tree). The rest back the convention accessors on `Schema` when the document
/// does not declare its own `*LayerId` keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConventionConfig {
    pub root: String,
    pub participant: String,
    pub turn: String,
    pub utterance: String,
    pub word: String,
}

impl Default for ConventionConfig {
    fn default() -> Self {
        Self {
            root: "transcript".to_string(),
            participant: "who".to_string(),
            turn: "turn".to_string(),
            utterance: "utterance".to_string(),
            word: "word".to_string(),
        }
    }
}

/// Complete configuration for a graph
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub ids: IdConfig,
    pub decode: DecodeConfig,
    pub conventions: ConventionConfig,
}

impl GraphConfig {
    /// Set the generated id prefix
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ids.prefix = prefix.into();
        self
    }

    /// Set the decode nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.decode.max_depth = max_depth;
        self
    }

    /// Set the schema entry name of the root layer
    pub fn with_root_layer(mut self, root: impl Into<String>) -> Self {
        self.conventions.root = root.into();
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.ids.prefix.is_empty() {
            return Err(ConfigError::Empty("ids.prefix".to_string()));
        }

        if self.decode.max_depth == 0 || self.decode.max_depth > MAX_DECODE_DEPTH {
            return Err(ConfigError::range_with_hint(
                "decode.max_depth",
                self.decode.max_depth,
                1,
                MAX_DECODE_DEPTH,
                "Documents nest at least one level",
            ));
        }

        let conventions = [
            ("conventions.root", &self.conventions.root),
            ("conventions.participant", &self.conventions.participant),
            ("conventions.turn", &self.conventions.turn),
            ("conventions.utterance", &self.conventions.utterance),
            ("conventions.word", &self.conventions.word),
        ];
        for (field, value) in conventions {
            if value.is_empty() {
                return Err(ConfigError::Empty(field.to_string()));
            }
            if is_reserved_layer_id(value) {
                return Err(ConfigError::Reserved {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Load configuration from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        match export.version {
            None => return Err(ConfigError::MissingVersion),
            Some(CONFIG_VERSION) => {}
            Some(found) => {
                return Err(ConfigError::UnsupportedVersion {
                    found,
                    supported: vec![CONFIG_VERSION],
                })
            }
        }

        let config = Self {
            ids: export.ids.unwrap_or_default(),
            decode: export.decode.unwrap_or_default(),
            conventions: export.conventions.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Export configuration as versioned YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(CONFIG_VERSION),
            ids: Some(self.ids.clone()),
            decode: Some(self.decode.clone()),
            conventions: Some(self.conventions.clone()),
        };

        serde_yaml::to_string(&export).map_err(ConfigError::Yaml)
    }
}
