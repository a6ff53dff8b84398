//! # Data Views
//!
//! The validator and the realizer accept plain JSON, realized values, or a
//! mix of both (a merge overlays a plain patch on a realized record).
//! [`DataRef`] is a borrowed view over either representation; [`Fields`]
//! and [`Elements`] give uniform access to mappings and sequences.

use serde_json::{Map, Number, Value};

use crate::immutable::{ImmutableList, ImmutableValue, Record};

pub(crate) static NULL: Value = Value::Null;

/// A borrowed view over plain or realized data.
#[derive(Debug, Clone, Copy)]
pub enum DataRef<'a> {
    Plain(&'a Value),
    Immutable(&'a ImmutableValue),
}

impl<'a> DataRef<'a> {
    pub fn is_null(&self) -> bool {
        match self {
            Self::Plain(v) => v.is_null(),
            Self::Immutable(v) => v.is_null(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Plain(v) => v.as_bool(),
            Self::Immutable(v) => v.as_bool(),
        }
    }

    pub fn as_number(&self) -> Option<&'a Number> {
        match *self {
            Self::Plain(Value::Number(n)) => Some(n),
            Self::Plain(_) => None,
            Self::Immutable(v) => v.as_number(),
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Self::Plain(v) => v.as_str(),
            Self::Immutable(v) => v.as_str(),
        }
    }

    /// The realized record behind this view, if any.
    pub fn as_record(&self) -> Option<&'a Record> {
        match *self {
            Self::Immutable(v) => v.as_record(),
            Self::Plain(_) => None,
        }
    }

    /// Deep conversion to plain JSON, used when reporting values.
    pub fn to_plain(&self) -> Value {
        match self {
            Self::Plain(v) => (*v).clone(),
            Self::Immutable(v) => v.to_plain(),
        }
    }

    /// Mapping view of a plain object or a record.
    pub(crate) fn fields(&self) -> Option<Fields<'a>> {
        match *self {
            Self::Plain(Value::Object(map)) => Some(Fields::Plain(map)),
            Self::Plain(_) => None,
            Self::Immutable(ImmutableValue::Record(record)) => Some(Fields::Record(record)),
            Self::Immutable(_) => None,
        }
    }

    /// Sequence view of a plain array or an immutable list.
    pub(crate) fn elements(&self) -> Option<Elements<'a>> {
        match *self {
            Self::Plain(Value::Array(items)) => Some(Elements::Plain(items)),
            Self::Plain(_) => None,
            Self::Immutable(ImmutableValue::List(list)) => Some(Elements::List(list)),
            Self::Immutable(_) => None,
        }
    }

    /// Realize a primitive. Sequences and mappings yield `None`.
    pub(crate) fn to_immutable_primitive(&self) -> Option<ImmutableValue> {
        match self {
            Self::Plain(v) => ImmutableValue::from_primitive(v),
            Self::Immutable(ImmutableValue::List(_) | ImmutableValue::Record(_)) => None,
            Self::Immutable(v) => Some((*v).clone()),
        }
    }
}

impl<'a> From<&'a Value> for DataRef<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Plain(value)
    }
}

impl<'a> From<&'a ImmutableValue> for DataRef<'a> {
    fn from(value: &'a ImmutableValue) -> Self {
        Self::Immutable(value)
    }
}

/// Keyed access to mapping-like data.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Fields<'a> {
    Plain(&'a Map<String, Value>),
    Record(&'a Record),
    /// `patch` keys win; everything else comes from `base`.
    Overlay {
        base: &'a Record,
        patch: &'a Map<String, Value>,
    },
}

impl<'a> Fields<'a> {
    /// Value under `key`; `None` when the key is absent.
    pub(crate) fn get(&self, key: &str) -> Option<DataRef<'a>> {
        match *self {
            Self::Plain(map) => map.get(key).map(DataRef::Plain),
            Self::Record(record) => record.get(key).map(DataRef::Immutable),
            Self::Overlay { base, patch } => patch
                .get(key)
                .map(DataRef::Plain)
                .or_else(|| base.get(key).map(DataRef::Immutable)),
        }
    }
}

/// Indexed access to sequence-like data.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Elements<'a> {
    Plain(&'a [Value]),
    List(&'a ImmutableList),
}

impl<'a> Elements<'a> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Plain(items) => items.len(),
            Self::List(list) => list.len(),
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<DataRef<'a>> {
        match *self {
            Self::Plain(items) => items.get(index).map(DataRef::Plain),
            Self::List(list) => list.get(index).map(DataRef::Immutable),
        }
    }

    pub(crate) fn iter(self) -> impl Iterator<Item = DataRef<'a>> {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::immutable::RecordShape;
    use serde_json::json;
    use std::sync::Arc;

    fn record(keys: &[&str], values: Vec<ImmutableValue>) -> Record {
        let shape = Arc::new(RecordShape::new(
            None,
            keys.iter().map(|k| k.to_string()).collect(),
        ));
        Record::from_values(shape, values)
    }

    #[test]
    fn test_plain_views() {
        let value = json!({"a": [1, 2]});
        let data = DataRef::from(&value);
        let fields = data.fields().unwrap();
        let elements = fields.get("a").unwrap().elements().unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(
            elements.get(1).and_then(|d| d.as_number()).and_then(Number::as_i64),
            Some(2)
        );
        assert!(fields.get("b").is_none());
        assert!(data.elements().is_none());
    }

    #[test]
    fn test_immutable_views() {
        let list: ImmutableList = vec![ImmutableValue::from("x")].into_iter().collect();
        let value = ImmutableValue::Record(record(&["l"], vec![ImmutableValue::List(list)]));
        let data = DataRef::from(&value);
        assert!(data.as_record().is_some());
        let fields = data.fields().unwrap();
        let first = fields.get("l").unwrap().elements().unwrap().get(0).unwrap();
        assert_eq!(first.as_str(), Some("x"));
    }

    #[test]
    fn test_overlay_patch_wins() {
        let base = record(
            &["a", "b"],
            vec![ImmutableValue::from(1_i64), ImmutableValue::from(2_i64)],
        );
        let patch = json!({"b": 3, "c": 4});
        let patch = patch.as_object().unwrap();
        let overlay = Fields::Overlay {
            base: &base,
            patch,
        };
        assert_eq!(
            overlay.get("a").and_then(|d| d.as_number()).and_then(Number::as_i64),
            Some(1)
        );
        assert_eq!(
            overlay.get("b").and_then(|d| d.as_number()).and_then(Number::as_i64),
            Some(3)
        );
        assert!(overlay.get("c").is_some());
        assert!(overlay.get("d").is_none());
    }

    #[test]
    fn test_to_immutable_primitive() {
        let v = json!(true);
        assert_eq!(
            DataRef::from(&v).to_immutable_primitive(),
            Some(ImmutableValue::Bool(true))
        );
        let arr = json!([]);
        assert!(DataRef::from(&arr).to_immutable_primitive().is_none());
    }
}
