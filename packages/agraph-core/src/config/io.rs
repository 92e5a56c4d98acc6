//! Configuration I/O (YAML loading)
//!
//! Defines the YAML schema types. Loading and export live on `GraphConfig`.

use super::{ConventionConfig, DecodeConfig, IdConfig};
use serde::{Deserialize, Serialize};

/// Currently supported YAML schema version
pub const CONFIG_VERSION: u32 = 1;

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1). Optional here so a missing field
    /// reports `MissingVersion` instead of a generic YAML error.
    #[serde(default)]
    pub version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<IdConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decode: Option<DecodeConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conventions: Option<ConventionConfig>,
}
