//! # Engine Configuration
//!
//! Two switches control engine behavior:
//!
//! - `default_required`: when an object definition declares neither
//!   `required` nor `notRequired`, every declared property is required.
//! - `shallow_validate_immutable_record`: a realized record is validated by
//!   shape identity alone instead of walking its properties.
//!
//! A `SchemaConfig` is owned by the engine that uses it and never changes
//! underneath a running compile pass. Startup code builds one from
//! defaults plus [`ConfigOverrides`], typically loaded from a file.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Behavior switches read by the compiler and the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Make all declared properties of an object required unless the
    /// definition says otherwise.
    #[serde(alias = "defaultRequired")]
    pub default_required: bool,
    /// Accept a realized record by shape identity without re-walking it.
    #[serde(alias = "shallowValidateImmutableRecord")]
    pub shallow_validate_immutable_record: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            default_required: true,
            shallow_validate_immutable_record: true,
        }
    }
}

impl SchemaConfig {
    /// Return a copy with every field present in `overrides` replaced.
    pub fn apply(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(v) = overrides.default_required {
            self.default_required = v;
        }
        if let Some(v) = overrides.shallow_validate_immutable_record {
            self.shallow_validate_immutable_record = v;
        }
        self
    }
}

/// A partial configuration merged onto [`SchemaConfig`] defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    /// Override for [`SchemaConfig::default_required`].
    #[serde(default, alias = "defaultRequired")]
    pub default_required: Option<bool>,
    /// Override for [`SchemaConfig::shallow_validate_immutable_record`].
    #[serde(default, alias = "shallowValidateImmutableRecord")]
    pub shallow_validate_immutable_record: Option<bool>,
}

impl ConfigOverrides {
    /// Parse overrides from YAML or JSON text.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Config` if the text is not a mapping of known
    /// switches to booleans.
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| SchemaError::Config {
            reason: format!("invalid configuration overrides: {e}"),
        })
    }
}
