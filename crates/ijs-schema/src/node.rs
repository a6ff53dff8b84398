//! # Compiled Schema Nodes
//!
//! A compiled schema is a tree of immutable [`SchemaNode`]s shared through
//! [`Schema`] (`Arc<SchemaNode>`). The node's kind is an explicit tag,
//! [`SchemaBody`], decided once by the compiler; nothing downstream
//! re-derives it from shape.
//!
//! Object nodes carry a process-unique [`SchemaId`]. The engine keys its
//! record-shape cache by that id, so the node itself is never mutated after
//! compilation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ijs_core::SchemaKind;
use serde_json::{Map, Value};

/// A shared, compiled schema node.
pub type Schema = Arc<SchemaNode>;

/// Identity of a compiled object schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(u64);

impl SchemaId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Node-level metadata supplied through DSL options or raw definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMeta {
    /// Human-readable name, embedded in record shape names and errors.
    pub title: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Value used when an object property is absent from input data.
    pub default: Option<Value>,
    /// Any other option, kept verbatim.
    pub extra: Map<String, Value>,
}

/// Ordered property table of an object schema.
///
/// Declaration order is preserved; record shapes lay out their fields in
/// this order.
#[derive(Debug, Clone, Default)]
pub struct Properties(Vec<(String, Schema)>);

impl Properties {
    pub(crate) fn new(entries: Vec<(String, Schema)>) -> Self {
        Self(entries)
    }

    /// Look up the schema of a declared property.
    pub fn get(&self, key: &str) -> Option<&Schema> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    /// Whether `key` is a declared property.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Declared property names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// `(name, schema)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.0.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Body of an object schema.
#[derive(Debug)]
pub struct ObjectSchema {
    id: SchemaId,
    properties: Properties,
    required: Vec<String>,
}

impl ObjectSchema {
    pub(crate) fn new(properties: Properties, required: Vec<String>) -> Self {
        Self {
            id: SchemaId::next(),
            properties,
            required,
        }
    }

    /// Identity used to key the record-shape cache.
    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Names that must be present and non-null.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Whether a declared property must be present and non-null.
    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|r| r == key)
    }
}

/// The tagged kind of a schema node, one variant per [`SchemaKind`].
#[derive(Debug)]
pub enum SchemaBody {
    Number,
    String,
    Boolean,
    Object(ObjectSchema),
    /// Every element validates against `items`.
    Array { items: Schema },
    /// Membership in an ordered set of primitive literals.
    Enum { values: Vec<Value> },
    /// The first accepting alternative is authoritative.
    AnyOf { alternatives: Vec<Schema> },
    /// Tag only; never resolved.
    Reference { target: String },
}

impl SchemaBody {
    /// The kind tag of this body.
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Number => SchemaKind::Number,
            Self::String => SchemaKind::String,
            Self::Boolean => SchemaKind::Boolean,
            Self::Object(_) => SchemaKind::Object,
            Self::Array { .. } => SchemaKind::Array,
            Self::Enum { .. } => SchemaKind::Enum,
            Self::AnyOf { .. } => SchemaKind::AnyOf,
            Self::Reference { .. } => SchemaKind::Reference,
        }
    }
}

/// A compiled, normalized schema node.
#[derive(Debug)]
pub struct SchemaNode {
    body: SchemaBody,
    meta: NodeMeta,
}

impl SchemaNode {
    pub(crate) fn new(body: SchemaBody, meta: NodeMeta) -> Self {
        Self { body, meta }
    }

    pub fn kind(&self) -> SchemaKind {
        self.body.kind()
    }

    pub fn body(&self) -> &SchemaBody {
        &self.body
    }

    pub fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.title.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.meta.default.as_ref()
    }

    /// The object body, if this is an object schema.
    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.body {
            SchemaBody::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Render the node in normalized raw form.
    ///
    /// The output is itself a valid raw definition: compiling it with the
    /// `__raw` flag yields an equivalent node.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        match &self.body {
            SchemaBody::Number | SchemaBody::String | SchemaBody::Boolean => {
                out.insert("type".into(), Value::String(self.kind().as_str().into()));
            }
            SchemaBody::Object(object) => {
                out.insert("type".into(), Value::String("object".into()));
                let properties: Map<String, Value> = object
                    .properties
                    .iter()
                    .map(|(k, s)| (k.to_string(), s.to_json()))
                    .collect();
                out.insert("properties".into(), Value::Object(properties));
                out.insert(
                    "required".into(),
                    Value::Array(object.required.iter().cloned().map(Value::String).collect()),
                );
            }
            SchemaBody::Array { items } => {
                out.insert("type".into(), Value::String("array".into()));
                out.insert("items".into(), items.to_json());
            }
            SchemaBody::Enum { values } => {
                out.insert("enum".into(), Value::Array(values.clone()));
            }
            SchemaBody::AnyOf { alternatives } => {
                out.insert(
                    "anyOf".into(),
                    Value::Array(alternatives.iter().map(|a| a.to_json()).collect()),
                );
            }
            SchemaBody::Reference { target } => {
                out.insert("$ref".into(), Value::String(target.clone()));
            }
        }
        if let Some(title) = &self.meta.title {
            out.insert("title".into(), Value::String(title.clone()));
        }
        if let Some(description) = &self.meta.description {
            out.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(default) = &self.meta.default {
            out.insert("default".into(), default.clone());
        }
        for (k, v) in &self.meta.extra {
            out.entry(k.clone()).or_insert_with(|| v.clone());
        }
        Value::Object(out)
    }
}
