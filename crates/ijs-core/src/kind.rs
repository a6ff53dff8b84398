//! # Schema Kind Registry
//!
//! Defines the `SchemaKind` enum: the discriminant of every compiled schema
//! node. Five kinds are named directly by a `type` field (`number`, `string`,
//! `boolean`, `object`, `array`); three are derived from the shape of a raw
//! definition (`enum`, `anyOf`, `$ref`).
//!
//! Kind derivation from shape happens exactly once, while compiling a raw
//! definition. Compiled nodes carry their kind as an explicit tag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::SchemaError;

/// The kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaKind {
    /// Any JSON number.
    #[serde(rename = "number")]
    Number,
    /// Any string.
    #[serde(rename = "string")]
    String,
    /// `true` or `false`.
    #[serde(rename = "boolean")]
    Boolean,
    /// A mapping with declared properties.
    #[serde(rename = "object")]
    Object,
    /// A sequence whose elements share one item schema.
    #[serde(rename = "array")]
    Array,
    /// One of a fixed set of literal values.
    #[serde(rename = "_enum")]
    Enum,
    /// The first of several alternatives that accepts the value.
    #[serde(rename = "_anyOf")]
    AnyOf,
    /// A tagged reference, never resolved by the engine.
    #[serde(rename = "_$ref")]
    Reference,
}

/// Total number of schema kinds.
pub const SCHEMA_KIND_COUNT: usize = 8;

impl SchemaKind {
    /// Returns all kinds in registry order.
    pub fn all_kinds() -> &'static [SchemaKind] {
        &[
            Self::Number,
            Self::String,
            Self::Boolean,
            Self::Object,
            Self::Array,
            Self::Enum,
            Self::AnyOf,
            Self::Reference,
        ]
    }

    /// Returns the registry identifier for this kind.
    ///
    /// Derived kinds carry a leading underscore so that they can never
    /// collide with a `type` name written in a definition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Enum => "_enum",
            Self::AnyOf => "_anyOf",
            Self::Reference => "_$ref",
        }
    }

    /// Resolve a kind from a `type` name as written in a definition.
    ///
    /// Only the five directly nameable kinds are accepted.
    pub fn from_type_name(name: &str) -> Option<SchemaKind> {
        match name {
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            _ => None,
        }
    }

    /// Derive the kind of a raw definition from its shape.
    ///
    /// An explicit `type` wins; otherwise the presence of `enum`, `anyOf`
    /// or `$ref` decides, in that order. Returns `None` when the shape
    /// names no kind or `type` is not a known type name.
    pub fn derive(definition: &Map<String, Value>) -> Option<SchemaKind> {
        if let Some(type_name) = definition.get("type") {
            return type_name.as_str().and_then(Self::from_type_name);
        }
        if definition.contains_key("enum") {
            Some(Self::Enum)
        } else if definition.contains_key("anyOf") {
            Some(Self::AnyOf)
        } else if definition.contains_key("$ref") {
            Some(Self::Reference)
        } else {
            None
        }
    }

    /// Whether values of this kind pass through realization unchanged.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Number | Self::String | Self::Boolean)
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = SchemaError;

    /// Parse a kind from its registry identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all_kinds()
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| SchemaError::MalformedSchemaSyntax {
                reason: format!("unknown schema kind: {s:?}"),
            })
    }
}
