//! # Validator
//!
//! Recursive structural type-checking of plain or realized data against a
//! compiled schema.
//!
//! ## Contract
//!
//! Validation never raises. It returns `Ok(())` or the first [`Violation`]
//! found; `anyOf` is the one place that collects every alternative's
//! failure, because ambiguity between alternatives is a common authoring
//! error and the caller needs to see all rejection reasons at once.
//!
//! ## Messages
//!
//! ```text
//! Path: "a.b[2]"; Expected type: "number"; Actual value: "x"
//! Path: "f"; Expected enum of: ["a",2,false]; Actual value: true
//! Path: d; "anyOf" all option schemas failed, each error is:
//!   1: Path: "d"; Expected type: "string"; Actual value: 3
//!   2: Path: "d"; Expected type: "boolean"; Actual value: 3
//! ```
//!
//! Actual values are rendered as plain JSON, so realized records show
//! their contents instead of an opaque handle.
//!
//! A `default` never stands in for missing data here: a required property
//! that is absent fails even when its schema carries a default.

use std::fmt::{self, Write as _};

use ijs_core::Violation;
use serde_json::{Number, Value};

use crate::data::{DataRef, Fields, NULL};
use crate::engine::SchemaEngine;
use crate::node::{ObjectSchema, SchemaBody, SchemaNode};

pub(crate) fn validate(
    engine: &SchemaEngine,
    schema: &SchemaNode,
    data: DataRef<'_>,
    path: &str,
) -> Result<(), Violation> {
    match schema.body() {
        SchemaBody::Number => expect(data.as_number().is_some(), path, "number", data),
        SchemaBody::String => expect(data.as_str().is_some(), path, "string", data),
        SchemaBody::Boolean => expect(data.as_bool().is_some(), path, "boolean", data),
        SchemaBody::Array { items } => match data.elements() {
            Some(elements) => {
                for (index, item) in elements.iter().enumerate() {
                    validate(engine, items, item, &index_path(path, index))?;
                }
                Ok(())
            }
            None => Err(type_mismatch(path, "array", data)),
        },
        SchemaBody::Object(object) => validate_object(engine, schema, object, data, path),
        SchemaBody::Enum { values } => {
            if values.iter().any(|literal| literal_eq(literal, data)) {
                Ok(())
            } else {
                Err(violation(
                    path,
                    format_args!("Expected enum of: {}", Value::Array(values.clone())),
                    data,
                ))
            }
        }
        SchemaBody::AnyOf { alternatives } => {
            let mut failures = Vec::with_capacity(alternatives.len());
            for alternative in alternatives {
                match validate(engine, alternative, data, path) {
                    Ok(()) => return Ok(()),
                    Err(failure) => failures.push(failure),
                }
            }
            let mut message =
                format!("Path: {path}; \"anyOf\" all option schemas failed, each error is:\n");
            for (i, failure) in failures.iter().enumerate() {
                let _ = writeln!(message, "  {}: {}", i + 1, failure);
            }
            Err(Violation::new(path, message))
        }
        SchemaBody::Reference { target } => Err(violation(
            path,
            format_args!("Unresolved schema reference {target:?}"),
            data,
        )),
    }
}

fn validate_object(
    engine: &SchemaEngine,
    schema: &SchemaNode,
    object: &ObjectSchema,
    data: DataRef<'_>,
    path: &str,
) -> Result<(), Violation> {
    if let Some(record) = data.as_record() {
        if engine.config().shallow_validate_immutable_record {
            let shape = engine.shape_for(schema, object);
            return if record.is_instance_of(&shape) {
                Ok(())
            } else {
                Err(violation(
                    path,
                    format_args!("Expected immutable record {}", shape.name()),
                    data,
                ))
            };
        }
    }
    match data.fields() {
        Some(fields) => validate_fields(engine, object, &fields, path),
        None => Err(type_mismatch(path, "object", data)),
    }
}

/// Check every declared property of `object` against `fields`.
///
/// Undeclared keys in `fields` are ignored.
pub(crate) fn validate_fields(
    engine: &SchemaEngine,
    object: &ObjectSchema,
    fields: &Fields<'_>,
    path: &str,
) -> Result<(), Violation> {
    for (key, property) in object.properties().iter() {
        validate_property(engine, object, key, property, fields.get(key), path)?;
    }
    Ok(())
}

/// Check one declared property.
///
/// A missing key is checked as null, so optional properties that are
/// missing or null are skipped and required ones fail. Defaults only come
/// into play during realization.
pub(crate) fn validate_property(
    engine: &SchemaEngine,
    object: &ObjectSchema,
    key: &str,
    property: &SchemaNode,
    value: Option<DataRef<'_>>,
    path: &str,
) -> Result<(), Violation> {
    let value = value.unwrap_or(DataRef::Plain(&NULL));
    if value.is_null() && !object.is_required(key) {
        return Ok(());
    }
    validate(engine, property, value, &property_path(path, key))
}

pub(crate) fn property_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

pub(crate) fn index_path(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

fn expect(ok: bool, path: &str, expected: &str, data: DataRef<'_>) -> Result<(), Violation> {
    if ok {
        Ok(())
    } else {
        Err(type_mismatch(path, expected, data))
    }
}

pub(crate) fn type_mismatch(path: &str, expected: &str, data: DataRef<'_>) -> Violation {
    violation(path, format_args!("Expected type: \"{expected}\""), data)
}

fn violation(path: &str, expected: fmt::Arguments<'_>, data: DataRef<'_>) -> Violation {
    Violation::new(
        path,
        format!(
            "Path: \"{path}\"; {expected}; Actual value: {}",
            data.to_plain()
        ),
    )
}

/// Enum membership: equal primitives of the same kind.
fn literal_eq(literal: &Value, data: DataRef<'_>) -> bool {
    match literal {
        Value::Null => data.is_null(),
        Value::Bool(b) => data.as_bool() == Some(*b),
        Value::String(s) => data.as_str() == Some(s.as_str()),
        Value::Number(n) => data.as_number().is_some_and(|d| numbers_eq(n, d)),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Numeric equality across integer and float representations, so that
/// `2` and `2.0` are the same enum member.
fn numbers_eq(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
