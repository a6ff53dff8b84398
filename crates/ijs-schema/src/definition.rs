//! # Schema Definitions
//!
//! [`SchemaDef`] is the uncompiled input to the compiler. It mirrors the
//! four DSL forms:
//!
//! ```text
//! "number|default:0"                     type expression
//! ["string", {"__options": {...}}]       array of an item definition
//! {"name": "string", "tags": ["string"]} simple object syntax
//! {"__raw": true, "enum": [1, 2]}        raw, already-normalized form
//! ```
//!
//! Definitions usually come from JSON or YAML via `From<Value>`. Compiled
//! nodes can be embedded anywhere a definition is expected, which is how
//! `compile_enum` and `compile_any_of` results are used inside larger
//! object definitions.

use serde_json::{Map, Value};

use crate::node::Schema;

/// Key holding the node-level overlay in object and array definitions.
pub const OPTIONS_KEY: &str = "__options";

/// Key flagging a mapping as a raw definition.
pub const RAW_KEY: &str = "__raw";

/// An uncompiled schema definition.
#[derive(Debug, Clone)]
pub enum SchemaDef {
    /// An already compiled node; compiling it returns it unchanged.
    Compiled(Schema),
    /// A `type[|key:literal]*` expression.
    Type(String),
    /// `[item]` or `[item, {"__options": {...}}]`.
    Sequence(Vec<SchemaDef>),
    /// Simple object syntax: property name to nested definition.
    Object {
        properties: Vec<(String, SchemaDef)>,
        /// The `__options` overlay, if any.
        options: Option<Value>,
    },
    /// A mapping flagged with `__raw`, flag removed.
    Raw(Map<String, Value>),
    /// Anything else; never compiles.
    Literal(Value),
}

impl SchemaDef {
    /// Simple object syntax from `(name, definition)` pairs.
    pub fn object<K, D>(properties: impl IntoIterator<Item = (K, D)>) -> Self
    where
        K: Into<String>,
        D: Into<SchemaDef>,
    {
        Self::Object {
            properties: properties
                .into_iter()
                .map(|(k, d)| (k.into(), d.into()))
                .collect(),
            options: None,
        }
    }

    /// Array syntax with a single item definition.
    pub fn array(item: impl Into<SchemaDef>) -> Self {
        Self::Sequence(vec![item.into()])
    }

    /// Attach a node-level overlay.
    ///
    /// Applies to object and array definitions; other forms carry their
    /// options inline and are returned unchanged.
    pub fn with_options(self, overlay: Map<String, Value>) -> Self {
        match self {
            Self::Object { properties, .. } => Self::Object {
                properties,
                options: Some(Value::Object(overlay)),
            },
            Self::Sequence(mut items) if items.len() == 1 => {
                items.push(Self::Object {
                    properties: Vec::new(),
                    options: Some(Value::Object(overlay)),
                });
                Self::Sequence(items)
            }
            other => other,
        }
    }

    /// Plain rendering for error messages.
    pub fn describe(&self) -> String {
        self.to_plain().to_string()
    }

    fn to_plain(&self) -> Value {
        match self {
            Self::Compiled(schema) => schema.to_json(),
            Self::Type(text) => Value::String(text.clone()),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_plain).collect()),
            Self::Object {
                properties,
                options,
            } => {
                let mut map: Map<String, Value> = properties
                    .iter()
                    .map(|(k, d)| (k.clone(), d.to_plain()))
                    .collect();
                if let Some(options) = options {
                    map.insert(OPTIONS_KEY.into(), options.clone());
                }
                Value::Object(map)
            }
            Self::Raw(map) => {
                let mut map = map.clone();
                map.insert(RAW_KEY.into(), Value::Bool(true));
                Value::Object(map)
            }
            Self::Literal(value) => value.clone(),
        }
    }
}

impl From<Value> for SchemaDef {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Type(text),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(mut map) => {
                let raw = map.remove(RAW_KEY);
                if raw.as_ref().and_then(Value::as_bool) == Some(true) {
                    return Self::Raw(map);
                }
                let options = map.remove(OPTIONS_KEY);
                Self::Object {
                    properties: map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
                    options,
                }
            }
            other => Self::Literal(other),
        }
    }
}

impl From<&str> for SchemaDef {
    fn from(text: &str) -> Self {
        Self::Type(text.to_string())
    }
}

impl From<String> for SchemaDef {
    fn from(text: String) -> Self {
        Self::Type(text)
    }
}

impl From<Schema> for SchemaDef {
    fn from(schema: Schema) -> Self {
        Self::Compiled(schema)
    }
}

impl From<&Schema> for SchemaDef {
    fn from(schema: &Schema) -> Self {
        Self::Compiled(Schema::clone(schema))
    }
}
