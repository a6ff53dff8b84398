//! # Schema Engine
//!
//! [`SchemaEngine`] binds a [`SchemaConfig`] to the record-shape cache and
//! exposes the compile, validate, realize and merge operations. The
//! configuration is fixed for the lifetime of an engine.
//!
//! Schemas are plain `Arc`s and can be used with any engine, but record
//! shapes are per engine: a record realized by one engine does not pass
//! the shallow identity check of another.
//!
//! ```
//! use ijs_schema::SchemaEngine;
//! use serde_json::json;
//!
//! let engine = SchemaEngine::new();
//! let schema = engine.compile(json!({"x": "number", "y": "number"})).unwrap();
//! assert!(engine.validate(&schema, &json!({"x": 1, "y": 2})).is_ok());
//!
//! let point = engine.create_immutable(&schema, &json!({"x": 1, "y": 2})).unwrap();
//! let moved = engine
//!     .merge_immutable(&schema, &point, json!({"x": 5}).as_object().unwrap())
//!     .unwrap();
//! assert_eq!(moved.to_plain(), json!({"x": 5, "y": 2}));
//! ```

use std::sync::{Arc, OnceLock};

use ijs_core::{SchemaConfig, SchemaError, Violation};
use serde_json::{Map, Value};

use crate::compile::Compiler;
use crate::data::DataRef;
use crate::definition::SchemaDef;
use crate::immutable::{ImmutableValue, RecordShape};
use crate::node::{ObjectSchema, Schema, SchemaNode};
use crate::realize;
use crate::record_cache::RecordShapeCache;
use crate::validate;

/// Compiler, validator and realizer sharing one configuration.
#[derive(Debug, Default)]
pub struct SchemaEngine {
    config: SchemaConfig,
    records: RecordShapeCache,
}

impl SchemaEngine {
    /// An engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SchemaConfig) -> Self {
        Self {
            config,
            records: RecordShapeCache::default(),
        }
    }

    /// The process-wide engine behind the crate's free functions. Uses the
    /// default configuration.
    pub fn global() -> &'static SchemaEngine {
        static GLOBAL: OnceLock<SchemaEngine> = OnceLock::new();
        GLOBAL.get_or_init(SchemaEngine::new)
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Compile a definition. Compiling a compiled schema returns the same
    /// `Arc`.
    ///
    /// # Errors
    ///
    /// `MalformedSchemaSyntax` for grammar violations or bad options;
    /// `UnsupportedSchemaDefinition` for literals.
    pub fn compile(&self, definition: impl Into<SchemaDef>) -> Result<Schema, SchemaError> {
        let definition = definition.into();
        tracing::debug!(
            default_required = self.config.default_required,
            "compile pass started"
        );
        let schema = Compiler::new(self).compile(&definition)?;
        tracing::debug!(kind = %schema.kind(), "compile pass finished");
        Ok(schema)
    }

    /// Compile an enum from a sequence of primitive literals, or from the
    /// values of a mapping.
    pub fn compile_enum(&self, values: Value) -> Result<Schema, SchemaError> {
        Compiler::new(self).compile_enum(values)
    }

    /// Compile each alternative and wrap them in an `anyOf` node.
    pub fn compile_any_of<I, D>(&self, alternatives: I) -> Result<Schema, SchemaError>
    where
        I: IntoIterator<Item = D>,
        D: Into<SchemaDef>,
    {
        let alternatives: Vec<SchemaDef> = alternatives.into_iter().map(Into::into).collect();
        Compiler::new(self).compile_any_of(&alternatives)
    }

    /// Validate plain or realized data. Never fails with an error; the
    /// violation is the result.
    pub fn validate<'a>(
        &self,
        schema: &SchemaNode,
        data: impl Into<DataRef<'a>>,
    ) -> Result<(), Violation> {
        self.validate_at(schema, data, "")
    }

    /// Like [`validate`](Self::validate), with reported paths prefixed by
    /// `path`.
    pub fn validate_at<'a>(
        &self,
        schema: &SchemaNode,
        data: impl Into<DataRef<'a>>,
        path: &str,
    ) -> Result<(), Violation> {
        validate::validate(self, schema, data.into(), path)
    }

    /// Validate and turn a violation into `SchemaError::ValidationFailed`.
    pub fn ensure_schema<'a>(
        &self,
        schema: &SchemaNode,
        data: impl Into<DataRef<'a>>,
    ) -> Result<(), SchemaError> {
        self.validate(schema, data)
            .map_err(|violation| SchemaError::ValidationFailed {
                title: schema.title().unwrap_or_default().to_string(),
                violation,
            })
    }

    /// The record shape of an object schema, built on first use. `None`
    /// for other kinds.
    pub fn record_shape(&self, schema: &SchemaNode) -> Option<Arc<RecordShape>> {
        schema
            .as_object()
            .map(|object| self.shape_for(schema, object))
    }

    /// Validate `data` and realize it as an immutable value.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` when the data does not conform.
    pub fn create_immutable<'a>(
        &self,
        schema: &SchemaNode,
        data: impl Into<DataRef<'a>>,
    ) -> Result<ImmutableValue, SchemaError> {
        realize::create(self, schema, data.into())
    }

    /// Overlay `patch` on a realized value and realize the result.
    ///
    /// # Errors
    ///
    /// `UnsupportedMergeTarget` unless `schema` is an object or `anyOf`
    /// schema; `ValidationFailed` when the merged data does not conform.
    pub fn merge_immutable(
        &self,
        schema: &SchemaNode,
        existing: &ImmutableValue,
        patch: &Map<String, Value>,
    ) -> Result<ImmutableValue, SchemaError> {
        realize::merge(self, schema, existing, patch)
    }

    /// Number of record shapes built so far.
    pub fn cached_shape_count(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn shape_for(&self, schema: &SchemaNode, object: &ObjectSchema) -> Arc<RecordShape> {
        self.records.shape_for(object, schema.title())
    }
}
