//! # Immutable Values
//!
//! The realized form of schema data. Primitives are stored as-is, arrays
//! become [`ImmutableList`]s and objects become [`Record`]s: fixed-key
//! containers whose keys are exactly the declared properties of the object
//! schema that produced them.
//!
//! Every record points at a shared [`RecordShape`]. Shapes are handed out
//! by the engine's cache, one per object schema, so "was this record built
//! by that schema?" is a pointer comparison.
//!
//! Values are never mutated in place. [`Record::with`] returns a new record
//! that shares every untouched field with the original.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// The fixed key layout of records produced by one object schema.
#[derive(Debug)]
pub struct RecordShape {
    name: String,
    keys: Vec<String>,
    index: HashMap<String, usize>,
}

impl RecordShape {
    pub(crate) fn new(title: Option<&str>, keys: Vec<String>) -> Self {
        let index = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();
        Self {
            name: format!("SchemaRecord[{}]", title.unwrap_or_default()),
            keys,
            index,
        }
    }

    /// Display name, `SchemaRecord[<title>]`. Diagnostic only.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// An instance of a [`RecordShape`].
#[derive(Debug, Clone)]
pub struct Record {
    shape: Arc<RecordShape>,
    values: Arc<[ImmutableValue]>,
}

impl Record {
    /// Build a record from values laid out in shape order.
    ///
    /// Missing trailing values are filled with `Null`; extra values are
    /// dropped.
    pub(crate) fn from_values(shape: Arc<RecordShape>, mut values: Vec<ImmutableValue>) -> Self {
        values.resize(shape.len(), ImmutableValue::Null);
        Self {
            shape,
            values: values.into(),
        }
    }

    pub fn shape(&self) -> &Arc<RecordShape> {
        &self.shape
    }

    /// Whether this record was built from exactly `shape`.
    pub fn is_instance_of(&self, shape: &Arc<RecordShape>) -> bool {
        Arc::ptr_eq(&self.shape, shape)
    }

    /// Field value, `None` if `key` is not part of the shape.
    pub fn get(&self, key: &str) -> Option<&ImmutableValue> {
        self.shape.index_of(key).and_then(|i| self.values.get(i))
    }

    /// `(key, value)` pairs in shape order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ImmutableValue)> {
        self.shape
            .keys
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// A copy with one field replaced.
    ///
    /// No validation happens here. Returns `None` if `key` is not part of
    /// the shape.
    pub fn with(&self, key: &str, value: impl Into<ImmutableValue>) -> Option<Record> {
        let index = self.shape.index_of(key)?;
        let mut values = self.values.to_vec();
        values[index] = value.into();
        Some(Self {
            shape: Arc::clone(&self.shape),
            values: values.into(),
        })
    }

    /// Whether field storage is shared with `other`.
    pub fn shares_storage_with(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }

    /// Deep conversion to plain JSON. Unset fields render as `null`.
    pub fn to_plain(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.to_string(), v.to_plain()))
                .collect::<Map<String, Value>>(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shape, &other.shape) && self.values == other.values
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.shape.name, self.to_plain())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// An immutable ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmutableList(Arc<[ImmutableValue]>);

impl ImmutableList {
    pub fn get(&self, index: usize) -> Option<&ImmutableValue> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImmutableValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_plain(&self) -> Value {
        Value::Array(self.0.iter().map(ImmutableValue::to_plain).collect())
    }
}

impl Default for ImmutableList {
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}

impl FromIterator<ImmutableValue> for ImmutableList {
    fn from_iter<I: IntoIterator<Item = ImmutableValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect::<Vec<_>>().into())
    }
}

impl Serialize for ImmutableList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for item in self.iter() {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

/// A realized value.
#[derive(Debug, Clone, PartialEq)]
pub enum ImmutableValue {
    /// Absence. Also the value of unset record fields.
    Null,
    Bool(bool),
    Number(Number),
    String(Arc<str>),
    List(ImmutableList),
    Record(Record),
}

impl ImmutableValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ImmutableList> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Convert a plain primitive. Arrays and objects have no schema-free
    /// realization and yield `None`.
    pub fn from_primitive(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::String(Arc::from(s.as_str()))),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Deep conversion to plain JSON.
    pub fn to_plain(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.to_string()),
            Self::List(list) => list.to_plain(),
            Self::Record(record) => record.to_plain(),
        }
    }
}

impl Serialize for ImmutableValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(list) => list.serialize(serializer),
            Self::Record(record) => record.serialize(serializer),
        }
    }
}

impl From<bool> for ImmutableValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ImmutableValue {
    fn from(n: i64) -> Self {
        Self::Number(Number::from(n))
    }
}

impl From<Number> for ImmutableValue {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ImmutableValue {
    fn from(s: &str) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<String> for ImmutableValue {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<ImmutableList> for ImmutableValue {
    fn from(list: ImmutableList) -> Self {
        Self::List(list)
    }
}

impl From<Record> for ImmutableValue {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}
