//! # ijs-schema — Schema Compiler, Validator & Immutable Realization
//!
//! Compiles a compact schema DSL into a normalized schema tree, validates
//! plain or realized data against it, and realizes validated data into
//! immutable, shape-typed records that support safe partial updates.
//!
//! ## Definitions (`definition`, `dsl`)
//!
//! A [`SchemaDef`] is one of the DSL forms: a `type|key:literal` string,
//! an `[item]` sequence, a simple object mapping, or a `__raw` mapping.
//! Definitions usually come from JSON or YAML through `From<Value>`.
//!
//! ## Compilation (`compile`)
//!
//! [`SchemaEngine::compile`] produces a [`Schema`], an `Arc` of an
//! immutable [`SchemaNode`] tagged with its kind. Compiling a compiled
//! schema returns the same `Arc`.
//!
//! ## Validation (`validate`)
//!
//! [`SchemaEngine::validate`] returns `Ok(())` or the first [`Violation`]
//! with its path (`a.b[2].c`). It never raises; [`SchemaEngine::ensure_schema`]
//! is the raising wrapper.
//!
//! ## Realization (`realize`, `immutable`)
//!
//! [`SchemaEngine::create_immutable`] turns conforming data into an
//! [`ImmutableValue`]. Objects become [`Record`]s whose [`RecordShape`] is
//! cached per schema, so a realized record validates against its own
//! schema by identity. [`SchemaEngine::merge_immutable`] derives an
//! updated record from a partial patch.
//!
//! ## Crate Policy
//!
//! - Depends only on `ijs-core` internally.
//! - Compiled nodes are never mutated; per-schema state lives in the engine.
//! - The free functions below use [`SchemaEngine::global`], which has the
//!   default configuration. Build a [`SchemaEngine`] for anything else.

mod compile;
pub mod data;
pub mod definition;
pub mod dsl;
pub mod engine;
pub mod immutable;
pub mod node;
mod realize;
mod record_cache;
mod validate;

pub use data::DataRef;
pub use definition::{SchemaDef, OPTIONS_KEY, RAW_KEY};
pub use dsl::{parse_type_expr, TypeExpr};
pub use engine::SchemaEngine;
pub use immutable::{ImmutableList, ImmutableValue, Record, RecordShape};
pub use node::{NodeMeta, ObjectSchema, Properties, Schema, SchemaBody, SchemaId, SchemaNode};

pub use ijs_core::{ConfigOverrides, SchemaConfig, SchemaError, SchemaKind, Violation};

use serde_json::{Map, Value};

/// Compile with the global engine.
pub fn compile(definition: impl Into<SchemaDef>) -> Result<Schema, SchemaError> {
    SchemaEngine::global().compile(definition)
}

/// Compile an enum with the global engine.
pub fn compile_enum(values: Value) -> Result<Schema, SchemaError> {
    SchemaEngine::global().compile_enum(values)
}

/// Compile an `anyOf` with the global engine.
pub fn compile_any_of<I, D>(alternatives: I) -> Result<Schema, SchemaError>
where
    I: IntoIterator<Item = D>,
    D: Into<SchemaDef>,
{
    SchemaEngine::global().compile_any_of(alternatives)
}

/// Validate with the global engine.
pub fn validate<'a>(schema: &SchemaNode, data: impl Into<DataRef<'a>>) -> Result<(), Violation> {
    SchemaEngine::global().validate(schema, data)
}

/// Validate with the global engine, failing with `ValidationFailed`.
pub fn ensure_schema<'a>(
    schema: &SchemaNode,
    data: impl Into<DataRef<'a>>,
) -> Result<(), SchemaError> {
    SchemaEngine::global().ensure_schema(schema, data)
}

/// Realize with the global engine.
pub fn create_immutable_schema_data<'a>(
    schema: &SchemaNode,
    data: impl Into<DataRef<'a>>,
) -> Result<ImmutableValue, SchemaError> {
    SchemaEngine::global().create_immutable(schema, data)
}

/// Merge with the global engine.
pub fn merge_immutable_schema_data(
    schema: &SchemaNode,
    existing: &ImmutableValue,
    patch: &Map<String, Value>,
) -> Result<ImmutableValue, SchemaError> {
    SchemaEngine::global().merge_immutable(schema, existing, patch)
}
