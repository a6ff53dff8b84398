//! # Realization and Merge
//!
//! Builds [`ImmutableValue`]s from data that has already passed
//! validation, and derives updated records from partial patches.
//!
//! Objects become records of the schema's shape: undeclared input keys are
//! dropped, absent keys with a `default` take the default. A record that
//! already has the right shape is reused as is. For `anyOf` the first
//! alternative that accepts the data is used.
//!
//! A merge overlays a plain patch on an existing record. Only the overlay
//! is validated when the record came from the same schema; fields the
//! patch does not name keep their existing values. Nested values in the
//! patch replace the existing ones wholesale.

use ijs_core::{SchemaError, Violation};
use serde_json::{Map, Value};

use crate::data::{DataRef, Fields, NULL};
use crate::engine::SchemaEngine;
use crate::immutable::{ImmutableList, ImmutableValue, Record};
use crate::node::{ObjectSchema, SchemaBody, SchemaNode};
use crate::validate::{
    index_path, property_path, type_mismatch, validate, validate_fields, validate_property,
};

/// Validate `data` and realize it. Null data realizes to `Null`.
pub(crate) fn create(
    engine: &SchemaEngine,
    schema: &SchemaNode,
    data: DataRef<'_>,
) -> Result<ImmutableValue, SchemaError> {
    if data.is_null() {
        return Ok(ImmutableValue::Null);
    }
    engine.ensure_schema(schema, data)?;
    realize(engine, schema, data, "").map_err(|violation| failed(schema, violation))
}

/// Overlay `patch` on `existing` and realize the result.
pub(crate) fn merge(
    engine: &SchemaEngine,
    schema: &SchemaNode,
    existing: &ImmutableValue,
    patch: &Map<String, Value>,
) -> Result<ImmutableValue, SchemaError> {
    match schema.body() {
        SchemaBody::Object(object) => match existing {
            ImmutableValue::Record(record) => merge_record(engine, schema, object, record, patch),
            ImmutableValue::Null => {
                let data = Value::Object(patch.clone());
                create(engine, schema, DataRef::Plain(&data))
            }
            other => Err(failed(
                schema,
                type_mismatch("", "object", DataRef::Immutable(other)),
            )),
        },
        SchemaBody::AnyOf { alternatives } => {
            let existing_data = DataRef::Immutable(existing);
            match alternatives
                .iter()
                .find(|alternative| validate(engine, alternative, existing_data, "").is_ok())
            {
                Some(alternative) => {
                    tracing::trace!(kind = %alternative.kind(), "merge delegated to anyOf alternative");
                    merge(engine, alternative, existing, patch)
                }
                None => match validate(engine, schema, existing_data, "") {
                    Err(violation) => Err(failed(schema, violation)),
                    Ok(()) => Err(failed(
                        schema,
                        Violation::new("", "no anyOf alternative accepts the existing value"),
                    )),
                },
            }
        }
        other => Err(SchemaError::UnsupportedMergeTarget { kind: other.kind() }),
    }
}

fn merge_record(
    engine: &SchemaEngine,
    schema: &SchemaNode,
    object: &ObjectSchema,
    record: &Record,
    patch: &Map<String, Value>,
) -> Result<ImmutableValue, SchemaError> {
    let shape = engine.shape_for(schema, object);
    let own_record = record.is_instance_of(&shape);
    let fields = Fields::Overlay {
        base: record,
        patch,
    };

    let checked = if own_record && engine.config().shallow_validate_immutable_record {
        object
            .properties()
            .iter()
            .filter(|(key, _)| patch.contains_key(*key))
            .try_for_each(|(key, property)| {
                validate_property(engine, object, key, property, fields.get(key), "")
            })
    } else {
        validate_fields(engine, object, &fields, "")
    };
    checked.map_err(|violation| failed(schema, violation))?;

    let touched = object
        .properties()
        .keys()
        .any(|key| patch.contains_key(key));
    if own_record && !touched {
        return Ok(ImmutableValue::Record(record.clone()));
    }

    let mut values = Vec::with_capacity(shape.len());
    for (key, property) in object.properties().iter() {
        let value = match patch.get(key) {
            Some(value) => realize(engine, property, DataRef::Plain(value), &property_path("", key)),
            None if own_record => Ok(record.get(key).cloned().unwrap_or(ImmutableValue::Null)),
            None => realize_field(engine, property, fields.get(key), &property_path("", key)),
        };
        values.push(value.map_err(|violation| failed(schema, violation))?);
    }
    tracing::trace!(shape = shape.name(), "merged record");
    Ok(ImmutableValue::Record(Record::from_values(shape, values)))
}

/// Realize data that has passed validation against `schema`.
fn realize(
    engine: &SchemaEngine,
    schema: &SchemaNode,
    data: DataRef<'_>,
    path: &str,
) -> Result<ImmutableValue, Violation> {
    if data.is_null() {
        return Ok(ImmutableValue::Null);
    }
    match schema.body() {
        SchemaBody::Number | SchemaBody::String | SchemaBody::Boolean | SchemaBody::Enum { .. } => {
            data.to_immutable_primitive()
                .ok_or_else(|| type_mismatch(path, schema.kind().as_str(), data))
        }
        SchemaBody::Array { items } => {
            let elements = data
                .elements()
                .ok_or_else(|| type_mismatch(path, "array", data))?;
            let list = elements
                .iter()
                .enumerate()
                .map(|(index, item)| realize(engine, items, item, &index_path(path, index)))
                .collect::<Result<ImmutableList, _>>()?;
            Ok(ImmutableValue::List(list))
        }
        SchemaBody::Object(object) => {
            let shape = engine.shape_for(schema, object);
            if let Some(record) = data.as_record() {
                if record.is_instance_of(&shape) {
                    return Ok(ImmutableValue::Record(record.clone()));
                }
            }
            let fields = data
                .fields()
                .ok_or_else(|| type_mismatch(path, "object", data))?;
            let values = object
                .properties()
                .iter()
                .map(|(key, property)| {
                    realize_field(engine, property, fields.get(key), &property_path(path, key))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ImmutableValue::Record(Record::from_values(shape, values)))
        }
        SchemaBody::AnyOf { alternatives } => {
            let chosen = alternatives
                .iter()
                .find(|alternative| validate(engine, alternative, data, path).is_ok());
            match chosen {
                Some(alternative) => {
                    tracing::trace!(path, kind = %alternative.kind(), "anyOf alternative selected");
                    realize(engine, alternative, data, path)
                }
                None => validate(engine, schema, data, path).and(Err(type_mismatch(
                    path,
                    schema.kind().as_str(),
                    data,
                ))),
            }
        }
        SchemaBody::Reference { .. } => {
            validate(engine, schema, data, path)?;
            Err(type_mismatch(path, schema.kind().as_str(), data))
        }
    }
}

/// Realize one object field; a missing key takes the property default.
fn realize_field(
    engine: &SchemaEngine,
    property: &SchemaNode,
    value: Option<DataRef<'_>>,
    path: &str,
) -> Result<ImmutableValue, Violation> {
    let value = value
        .or_else(|| property.default_value().map(DataRef::Plain))
        .unwrap_or(DataRef::Plain(&NULL));
    realize(engine, property, value, path)
}

fn failed(schema: &SchemaNode, violation: Violation) -> SchemaError {
    SchemaError::ValidationFailed {
        title: schema.title().unwrap_or_default().to_string(),
        violation,
    }
}
