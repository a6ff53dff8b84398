//! # ijs-proptypes — Component Property Checks
//!
//! Adapts a compiled schema to the component prop-validation convention:
//! a checker is called with the component's props, the name of the prop
//! to check, the component name, a location label (`prop`, `context`, ...)
//! and the prop's full name, and reports a failure as an error value.
//!
//! Each checker comes in two variants. The optional one accepts a missing
//! or null prop; the one returned by [`PropTypeChecker::is_required`]
//! reports it.
//!
//! ```
//! use ijs_proptypes::of_schema;
//! use serde_json::json;
//!
//! let schema = ijs_schema::compile(json!({"id": "number"})).unwrap();
//! let checker = of_schema(schema).is_required();
//!
//! let props = json!({"user": {"id": "7"}});
//! let props = props.as_object().unwrap();
//! let err = checker
//!     .check(props, "user", Some("Profile"), "prop", None)
//!     .unwrap_err();
//! assert!(err.to_string().starts_with(r#"In "Profile", prop "user" invalid."#));
//! ```

use ijs_core::Violation;
use ijs_schema::{DataRef, Record, Schema, SchemaEngine};
use serde_json::{Map, Value};
use thiserror::Error;

/// Component name used when the caller does not supply one.
pub const ANONYMOUS_COMPONENT: &str = "<<anonymous>>";

/// A failed property check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropTypeError {
    /// A required prop was missing or null.
    #[error("Required {location} `{prop_full_name}` was not specified in `{component_name}`.")]
    Missing {
        component_name: String,
        location: String,
        prop_full_name: String,
    },

    /// The prop did not conform to the schema.
    #[error("In \"{component_name}\", {location} \"{prop_full_name}\" invalid. Expect schema data. Error is:\n{violation}")]
    Invalid {
        component_name: String,
        location: String,
        prop_full_name: String,
        violation: Violation,
    },
}

/// Anything props can be read from by name.
pub trait PropSource {
    /// The prop called `name`, if present.
    fn prop(&self, name: &str) -> Option<DataRef<'_>>;
}

impl PropSource for Map<String, Value> {
    fn prop(&self, name: &str) -> Option<DataRef<'_>> {
        self.get(name).map(DataRef::Plain)
    }
}

impl PropSource for Value {
    fn prop(&self, name: &str) -> Option<DataRef<'_>> {
        self.as_object().and_then(|map| map.prop(name))
    }
}

impl PropSource for Record {
    fn prop(&self, name: &str) -> Option<DataRef<'_>> {
        self.get(name).map(DataRef::Immutable)
    }
}

/// Checks one prop against a compiled schema.
#[derive(Debug, Clone)]
pub struct PropTypeChecker<'e> {
    engine: &'e SchemaEngine,
    schema: Schema,
    required: bool,
}

/// An optional-prop checker backed by the global engine.
pub fn of_schema(schema: Schema) -> PropTypeChecker<'static> {
    PropTypeChecker::new(SchemaEngine::global(), schema)
}

impl<'e> PropTypeChecker<'e> {
    /// An optional-prop checker validating with `engine`.
    pub fn new(engine: &'e SchemaEngine, schema: Schema) -> Self {
        Self {
            engine,
            schema,
            required: false,
        }
    }

    /// The variant that reports a missing or null prop.
    pub fn is_required(&self) -> Self {
        Self {
            required: true,
            ..self.clone()
        }
    }

    /// Whether a missing prop is an error.
    pub fn required(&self) -> bool {
        self.required
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Check `props[prop_name]`.
    ///
    /// `component_name` defaults to [`ANONYMOUS_COMPONENT`] and
    /// `prop_full_name` to `prop_name`.
    pub fn check<P>(
        &self,
        props: &P,
        prop_name: &str,
        component_name: Option<&str>,
        location: &str,
        prop_full_name: Option<&str>,
    ) -> Result<(), PropTypeError>
    where
        P: PropSource + ?Sized,
    {
        let component_name = component_name.unwrap_or(ANONYMOUS_COMPONENT);
        let prop_full_name = prop_full_name.unwrap_or(prop_name);

        let value = match props.prop(prop_name).filter(|v| !v.is_null()) {
            Some(value) => value,
            None if self.required => {
                return Err(PropTypeError::Missing {
                    component_name: component_name.to_string(),
                    location: location.to_string(),
                    prop_full_name: prop_full_name.to_string(),
                })
            }
            None => return Ok(()),
        };

        self.engine.validate(&self.schema, value).map_err(|violation| {
            tracing::debug!(
                component = component_name,
                prop = prop_full_name,
                path = %violation.instance_path,
                "prop check failed"
            );
            PropTypeError::Invalid {
                component_name: component_name.to_string(),
                location: location.to_string(),
                prop_full_name: prop_full_name.to_string(),
                violation,
            }
        })
    }
}
