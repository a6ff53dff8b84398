//! # Schema Compiler
//!
//! Turns a [`SchemaDef`] into a compiled [`Schema`] tree.
//!
//! ## Forms
//!
//! - compiled node: returned unchanged (same `Arc`).
//! - type expression: `number`, `string`, `boolean` or `object`, followed
//!   by `|key:literal` options.
//! - sequence: `[item]` or `[item, {"__options": {...}}]`.
//! - simple object: every value is a nested definition.
//! - raw: a mapping that already names its kind through `type`, `enum`,
//!   `anyOf` or `$ref`. Only `items`, `properties` and `anyOf` are
//!   compiled further, as raw definitions themselves.
//!
//! ## Required policy
//!
//! Resolved once per object node: an explicit `required` list wins, then
//! all properties minus `notRequired`, then all properties when
//! `default_required` is on, otherwise none.
//!
//! A [`Compiler`] snapshots the engine configuration when it is created,
//! so one compile pass never sees two policies.

use std::collections::HashSet;
use std::sync::Arc;

use ijs_core::{SchemaConfig, SchemaError, SchemaKind};
use serde_json::{Map, Value};

use crate::data::DataRef;
use crate::definition::{SchemaDef, RAW_KEY};
use crate::dsl::parse_type_expr;
use crate::engine::SchemaEngine;
use crate::node::{NodeMeta, ObjectSchema, Properties, Schema, SchemaBody, SchemaNode};
use crate::validate::validate;

/// Keys that describe the structure of a node and cannot be overlaid.
const STRUCTURAL_KEYS: [&str; 6] = ["type", "properties", "items", "enum", "anyOf", "$ref"];

pub(crate) struct Compiler<'e> {
    engine: &'e SchemaEngine,
    config: SchemaConfig,
}

impl<'e> Compiler<'e> {
    pub(crate) fn new(engine: &'e SchemaEngine) -> Self {
        Self {
            engine,
            config: *engine.config(),
        }
    }

    pub(crate) fn compile(&self, definition: &SchemaDef) -> Result<Schema, SchemaError> {
        match definition {
            SchemaDef::Compiled(schema) => Ok(Arc::clone(schema)),
            SchemaDef::Type(text) => self.compile_type_expr(text),
            SchemaDef::Sequence(items) => self.compile_sequence(items),
            SchemaDef::Object {
                properties,
                options,
            } => self.compile_object(properties, options.as_ref()),
            SchemaDef::Raw(map) => self.compile_raw(map),
            SchemaDef::Literal(_) => Err(SchemaError::UnsupportedSchemaDefinition {
                definition: definition.describe(),
            }),
        }
    }

    /// Enum node from a sequence of literals, or from a mapping's values.
    pub(crate) fn compile_enum(&self, values: Value) -> Result<Schema, SchemaError> {
        let values = enum_values(values)?;
        self.finish(Draft::new(Shape::Enum(values)))
    }

    pub(crate) fn compile_any_of(&self, alternatives: &[SchemaDef]) -> Result<Schema, SchemaError> {
        let alternatives = alternatives
            .iter()
            .map(|alternative| self.compile(alternative))
            .collect::<Result<Vec<_>, _>>()?;
        self.finish(Draft::new(any_of(alternatives)?))
    }

    fn compile_type_expr(&self, text: &str) -> Result<Schema, SchemaError> {
        let expr = parse_type_expr(text)?;
        let shape = match SchemaKind::from_type_name(&expr.type_name) {
            Some(SchemaKind::Number) => Shape::Number,
            Some(SchemaKind::String) => Shape::String,
            Some(SchemaKind::Boolean) => Shape::Boolean,
            Some(SchemaKind::Object) => Shape::Object(Vec::new()),
            Some(SchemaKind::Array) => {
                return Err(SchemaError::malformed(format!(
                    "type expression {text:?} names an array without items; use the [item] form"
                )))
            }
            _ => {
                return Err(SchemaError::malformed(format!(
                    "unknown type {:?} in type expression {text:?}",
                    expr.type_name
                )))
            }
        };
        let mut draft = Draft::new(shape);
        for (key, value) in expr.options {
            draft.absorb(&key, value)?;
        }
        self.finish(draft)
    }

    fn compile_sequence(&self, items: &[SchemaDef]) -> Result<Schema, SchemaError> {
        let (item, overlay) = match items {
            [item] => (item, None),
            [item, SchemaDef::Object {
                properties,
                options,
            }] if properties.is_empty() => (item, options.as_ref()),
            _ => {
                return Err(SchemaError::malformed(format!(
                    "array definition must be [item] or [item, {{\"__options\": {{...}}}}], got {}",
                    SchemaDef::Sequence(items.to_vec()).describe()
                )))
            }
        };
        let mut draft = Draft::new(Shape::Array(self.compile(item)?));
        if let Some(overlay) = overlay {
            draft.absorb_overlay(overlay)?;
        }
        self.finish(draft)
    }

    fn compile_object(
        &self,
        properties: &[(String, SchemaDef)],
        overlay: Option<&Value>,
    ) -> Result<Schema, SchemaError> {
        let mut seen = HashSet::with_capacity(properties.len());
        let mut compiled = Vec::with_capacity(properties.len());
        for (key, definition) in properties {
            if !seen.insert(key.as_str()) {
                return Err(SchemaError::malformed(format!(
                    "duplicate property `{key}` in object definition"
                )));
            }
            compiled.push((key.clone(), self.compile(definition)?));
        }
        let mut draft = Draft::new(Shape::Object(compiled));
        if let Some(overlay) = overlay {
            draft.absorb_overlay(overlay)?;
        }
        self.finish(draft)
    }

    fn compile_raw(&self, raw: &Map<String, Value>) -> Result<Schema, SchemaError> {
        let kind = SchemaKind::derive(raw).ok_or_else(|| {
            SchemaError::malformed(format!(
                "raw definition does not name a schema kind: {}",
                Value::Object(raw.clone())
            ))
        })?;
        tracing::trace!(kind = %kind, "compiling raw definition");

        let shape = match kind {
            SchemaKind::Number => Shape::Number,
            SchemaKind::String => Shape::String,
            SchemaKind::Boolean => Shape::Boolean,
            SchemaKind::Object => {
                let properties = match raw.get("properties") {
                    None => Vec::new(),
                    Some(Value::Object(map)) => map
                        .iter()
                        .map(|(key, sub)| -> Result<(String, Schema), SchemaError> {
                            Ok((key.clone(), self.compile(&raw_sub(sub))?))
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    Some(other) => {
                        return Err(SchemaError::malformed(format!(
                            "raw `properties` must be a mapping, got {other}"
                        )))
                    }
                };
                Shape::Object(properties)
            }
            SchemaKind::Array => {
                let items = raw.get("items").ok_or_else(|| {
                    SchemaError::malformed("raw array definition is missing `items`")
                })?;
                Shape::Array(self.compile(&raw_sub(items))?)
            }
            SchemaKind::Enum => {
                let values = raw.get("enum").cloned().unwrap_or_default();
                Shape::Enum(enum_values(values)?)
            }
            SchemaKind::AnyOf => match raw.get("anyOf") {
                Some(Value::Array(alternatives)) => any_of(
                    alternatives
                        .iter()
                        .map(|sub| self.compile(&raw_sub(sub)))
                        .collect::<Result<Vec<_>, _>>()?,
                )?,
                _ => return Err(SchemaError::malformed("raw `anyOf` must be a sequence")),
            },
            SchemaKind::Reference => match raw.get("$ref") {
                Some(Value::String(target)) => Shape::Reference(target.clone()),
                _ => return Err(SchemaError::malformed("raw `$ref` must be a string")),
            },
        };

        let mut draft = Draft::new(shape);
        for (key, value) in raw {
            if !STRUCTURAL_KEYS.contains(&key.as_str()) {
                draft.absorb(key, value.clone())?;
            }
        }
        self.finish(draft)
    }

    /// Resolve the required policy and build the node. A non-conforming
    /// default is logged, not rejected.
    fn finish(&self, draft: Draft) -> Result<Schema, SchemaError> {
        let Draft {
            shape,
            meta,
            required,
            not_required,
        } = draft;

        let body = match shape {
            Shape::Object(properties) => {
                let required = match (required, not_required) {
                    (Some(required), _) => required,
                    (None, Some(not_required)) => properties
                        .iter()
                        .map(|(k, _)| k)
                        .filter(|k| !not_required.contains(*k))
                        .cloned()
                        .collect(),
                    (None, None) if self.config.default_required => {
                        properties.iter().map(|(k, _)| k.clone()).collect()
                    }
                    (None, None) => Vec::new(),
                };
                SchemaBody::Object(ObjectSchema::new(Properties::new(properties), required))
            }
            other => {
                if required.is_some() || not_required.is_some() {
                    return Err(SchemaError::malformed(format!(
                        "`required`/`notRequired` only apply to object schemas, not {}",
                        other.kind()
                    )));
                }
                other.into_body()
            }
        };

        let node = SchemaNode::new(body, meta);
        if let Some(default) = node.default_value().filter(|d| !d.is_null()) {
            if let Err(violation) = validate(self.engine, &node, DataRef::Plain(default), "") {
                tracing::warn!(
                    kind = %node.kind(),
                    default = %default,
                    %violation,
                    "default value does not conform to its schema"
                );
            }
        }
        tracing::trace!(kind = %node.kind(), title = node.title().unwrap_or_default(), "compiled node");
        Ok(Arc::new(node))
    }
}

/// A raw sub-definition: mappings are raw themselves, whatever their flag.
fn raw_sub(value: &Value) -> SchemaDef {
    match value {
        Value::Object(map) => {
            let mut map = map.clone();
            map.remove(RAW_KEY);
            SchemaDef::Raw(map)
        }
        other => SchemaDef::from(other.clone()),
    }
}

fn any_of(alternatives: Vec<Schema>) -> Result<Shape, SchemaError> {
    if alternatives.is_empty() {
        return Err(SchemaError::malformed("anyOf requires at least one alternative"));
    }
    Ok(Shape::AnyOf(alternatives))
}

fn enum_values(values: Value) -> Result<Vec<Value>, SchemaError> {
    let values = match values {
        Value::Array(values) => values,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => {
            return Err(SchemaError::malformed(format!(
                "enum values must be a sequence or a mapping, got {other}"
            )))
        }
    };
    if values.is_empty() {
        return Err(SchemaError::malformed("enum requires at least one value"));
    }
    if let Some(bad) = values
        .iter()
        .find(|v| matches!(v, Value::Array(_) | Value::Object(_)))
    {
        return Err(SchemaError::malformed(format!(
            "enum values must be primitive literals, got {bad}"
        )));
    }
    Ok(values)
}

fn string_list(key: &str, value: Value) -> Result<Vec<String>, SchemaError> {
    let invalid = || SchemaError::malformed(format!("`{key}` must be a list of property names"));
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(name),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

/// Structure of a node before the required policy is applied.
enum Shape {
    Number,
    String,
    Boolean,
    Object(Vec<(String, Schema)>),
    Array(Schema),
    Enum(Vec<Value>),
    AnyOf(Vec<Schema>),
    Reference(String),
}

impl Shape {
    fn kind(&self) -> SchemaKind {
        match self {
            Self::Number => SchemaKind::Number,
            Self::String => SchemaKind::String,
            Self::Boolean => SchemaKind::Boolean,
            Self::Object(_) => SchemaKind::Object,
            Self::Array(_) => SchemaKind::Array,
            Self::Enum(_) => SchemaKind::Enum,
            Self::AnyOf(_) => SchemaKind::AnyOf,
            Self::Reference(_) => SchemaKind::Reference,
        }
    }

    /// Body of a non-object shape.
    fn into_body(self) -> SchemaBody {
        match self {
            Self::Number => SchemaBody::Number,
            Self::String => SchemaBody::String,
            Self::Boolean => SchemaBody::Boolean,
            Self::Array(items) => SchemaBody::Array { items },
            Self::Enum(values) => SchemaBody::Enum { values },
            Self::AnyOf(alternatives) => SchemaBody::AnyOf { alternatives },
            Self::Reference(target) => SchemaBody::Reference { target },
            Self::Object(properties) => SchemaBody::Object(ObjectSchema::new(
                Properties::new(properties),
                Vec::new(),
            )),
        }
    }
}

struct Draft {
    shape: Shape,
    meta: NodeMeta,
    required: Option<Vec<String>>,
    not_required: Option<Vec<String>>,
}

impl Draft {
    fn new(shape: Shape) -> Self {
        Self {
            shape,
            meta: NodeMeta::default(),
            required: None,
            not_required: None,
        }
    }

    /// Apply an `__options` overlay. `null` is an empty overlay.
    fn absorb_overlay(&mut self, overlay: &Value) -> Result<(), SchemaError> {
        let map = match overlay {
            Value::Object(map) => map,
            Value::Null => return Ok(()),
            other => {
                return Err(SchemaError::malformed(format!(
                    "`__options` must be a mapping, got {other}"
                )))
            }
        };
        for (key, value) in map {
            self.absorb(key, value.clone())?;
        }
        Ok(())
    }

    /// Apply one node option. Later options replace earlier ones.
    fn absorb(&mut self, key: &str, value: Value) -> Result<(), SchemaError> {
        match key {
            "title" | "description" => {
                let Value::String(text) = value else {
                    return Err(SchemaError::malformed(format!("`{key}` must be a string")));
                };
                if key == "title" {
                    self.meta.title = Some(text);
                } else {
                    self.meta.description = Some(text);
                }
            }
            "default" => self.meta.default = Some(value),
            "required" => self.required = Some(string_list(key, value)?),
            "notRequired" => self.not_required = Some(string_list(key, value)?),
            _ if STRUCTURAL_KEYS.contains(&key) => {
                return Err(SchemaError::malformed(format!(
                    "option `{key}` would change the structure of the schema"
                )))
            }
            _ => {
                self.meta.extra.insert(key.to_string(), value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ijs_core::ConfigOverrides;
    use serde_json::json;

    fn compile(engine: &SchemaEngine, definition: Value) -> Result<Schema, SchemaError> {
        Compiler::new(engine).compile(&SchemaDef::from(definition))
    }

    fn required_of(schema: &Schema) -> Vec<String> {
        schema.as_object().map(|o| o.required().to_vec()).unwrap_or_default()
    }

    #[test]
    fn test_compiled_definition_is_returned_unchanged() {
        let engine = SchemaEngine::new();
        let schema = compile(&engine, json!("number")).unwrap();
        let again = Compiler::new(&engine)
            .compile(&SchemaDef::from(&schema))
            .unwrap();
        assert!(Arc::ptr_eq(&schema, &again));
    }

    #[test]
    fn test_type_expr_options_land_on_node() {
        let engine = SchemaEngine::new();
        let schema = compile(
            &engine,
            json!(r#"string|default:"anon"|title:"Name"|ui:{"w":3}"#),
        )
        .unwrap();
        assert_eq!(schema.kind(), SchemaKind::String);
        assert_eq!(schema.title(), Some("Name"));
        assert_eq!(schema.default_value(), Some(&json!("anon")));
        assert_eq!(schema.meta().extra.get("ui"), Some(&json!({"w": 3})));
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let engine = SchemaEngine::new();
        for text in ["integer", "array", "_enum"] {
            let err = compile(&engine, json!(text)).unwrap_err();
            assert!(
                matches!(err, SchemaError::MalformedSchemaSyntax { .. }),
                "{text}: {err}"
            );
        }
    }

    #[test]
    fn test_sequence_forms() {
        let engine = SchemaEngine::new();
        let schema = compile(&engine, json!(["number", {"__options": {"default": [1]}}])).unwrap();
        assert_eq!(schema.kind(), SchemaKind::Array);
        assert_eq!(schema.default_value(), Some(&json!([1])));

        for bad in [json!([]), json!(["number", "string"]), json!(["a", {}, {}])] {
            let err = compile(&engine, bad.clone()).unwrap_err();
            assert!(matches!(err, SchemaError::MalformedSchemaSyntax { .. }), "{bad}");
        }
    }

    #[test]
    fn test_required_policy() {
        let engine = SchemaEngine::new();
        let all = compile(&engine, json!({"a": "number", "b": "number", "c": "number"})).unwrap();
        assert_eq!(required_of(&all), vec!["a", "b", "c"]);

        let not_b = compile(
            &engine,
            json!({"a": "number", "b": "number", "c": "number", "__options": {"notRequired": ["b"]}}),
        )
        .unwrap();
        assert_eq!(required_of(&not_b), vec!["a", "c"]);

        let explicit = compile(
            &engine,
            json!({"a": "number", "b": "number", "__options": {"required": ["a"], "notRequired": ["a"]}}),
        )
        .unwrap();
        assert_eq!(required_of(&explicit), vec!["a"]);

        let lenient = SchemaEngine::with_config(SchemaConfig::default().apply(&ConfigOverrides {
            default_required: Some(false),
            ..ConfigOverrides::default()
        }));
        let none = compile(&lenient, json!({"a": "number"})).unwrap();
        assert!(required_of(&none).is_empty());
    }

    #[test]
    fn test_required_on_non_object_is_malformed() {
        let engine = SchemaEngine::new();
        let err = compile(&engine, json!(r#"number|required:["a"]"#)).unwrap_err();
        assert!(err.to_string().contains("only apply to object schemas"));
    }

    #[test]
    fn test_overlay_cannot_change_structure() {
        let engine = SchemaEngine::new();
        let err = compile(&engine, json!({"a": "number", "__options": {"type": "string"}})).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedSchemaSyntax { .. }));
        let err = compile(&engine, json!(r#"number|items:"string""#)).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedSchemaSyntax { .. }));
    }

    #[test]
    fn test_null_overlay_is_empty() {
        let engine = SchemaEngine::new();
        let schema = compile(&engine, json!({"a": "number", "__options": null})).unwrap();
        assert_eq!(required_of(&schema), ["a"]);
        assert_eq!(schema.title(), None);
        let schema = compile(&engine, json!(["string", {"__options": null}])).unwrap();
        assert_eq!(schema.kind(), SchemaKind::Array);
        let err = compile(&engine, json!({"a": "number", "__options": 3})).unwrap_err();
        assert!(err.to_string().contains("`__options` must be a mapping"));
    }

    #[test]
    fn test_raw_definition_compiles_composite_positions() {
        let engine = SchemaEngine::new();
        let schema = compile(
            &engine,
            json!({
                "__raw": true,
                "type": "object",
                "title": "Pair",
                "properties": {
                    "left": {"type": "number"},
                    "right": {"anyOf": [{"type": "string"}, {"enum": [1, 2]}]},
                    "list": {"type": "array", "items": {"type": "boolean"}}
                },
                "notRequired": ["right"]
            }),
        )
        .unwrap();
        let object = schema.as_object().unwrap();
        assert_eq!(schema.title(), Some("Pair"));
        assert_eq!(object.required(), ["left".to_string(), "list".to_string()]);
        assert_eq!(
            object.properties().get("right").map(|s| s.kind()),
            Some(SchemaKind::AnyOf)
        );
        assert_eq!(
            object.properties().get("list").map(|s| s.kind()),
            Some(SchemaKind::Array)
        );
    }

    #[test]
    fn test_raw_without_kind_is_malformed() {
        let engine = SchemaEngine::new();
        assert!(compile(&engine, json!({"__raw": true, "title": "x"})).is_err());
        assert!(compile(&engine, json!({"__raw": true, "type": "array"})).is_err());
        assert!(compile(&engine, json!({"__raw": true, "$ref": 3})).is_err());
    }

    #[test]
    fn test_literal_is_unsupported() {
        let engine = SchemaEngine::new();
        for literal in [json!(3), json!(true), Value::Null] {
            let err = compile(&engine, literal).unwrap_err();
            assert!(matches!(err, SchemaError::UnsupportedSchemaDefinition { .. }));
        }
    }

    #[test]
    fn test_default_is_kept_verbatim() {
        let engine = SchemaEngine::new();
        let schema = compile(&engine, json!("string|default:null")).unwrap();
        assert_eq!(schema.default_value(), Some(&Value::Null));
        let schema = compile(&engine, json!(r#"number|default:"zero""#)).unwrap();
        assert_eq!(schema.default_value(), Some(&json!("zero")));
        let schema = compile(&engine, json!({"a": "number", "__options": {"default": {}}})).unwrap();
        assert_eq!(schema.default_value(), Some(&json!({})));
        assert_eq!(required_of(&schema), ["a"]);
    }

    #[test]
    fn test_enum_values() {
        assert_eq!(
            enum_values(json!({"A": "a", "B": 2})).unwrap(),
            vec![json!("a"), json!(2)]
        );
        assert!(enum_values(json!([])).is_err());
        assert!(enum_values(json!([[1]])).is_err());
        assert!(enum_values(json!("a")).is_err());
    }

    #[test]
    fn test_duplicate_property_is_malformed() {
        let engine = SchemaEngine::new();
        let definition = SchemaDef::object([("a", "number"), ("a", "string")]);
        let err = Compiler::new(&engine).compile(&definition).unwrap_err();
        assert!(err.to_string().contains("duplicate property"));
    }
}
