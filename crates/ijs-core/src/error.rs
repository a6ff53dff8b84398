//! # Error Types
//!
//! Defines the errors raised by the compiler and the realization engine,
//! and the [`Violation`] value returned by the validator.
//!
//! ## Design
//!
//! - The validator never raises. It returns `Result<(), Violation>` so that
//!   callers decide whether a failure is fatal, recoverable (the next
//!   `anyOf` alternative) or advisory (a property checker warning).
//! - Compilation and realization raise `SchemaError` on the first failure.
//! - Every validation failure carries the structural path (`a.b[2].c`) and a
//!   plain rendering of the offending value.

use std::fmt;

use thiserror::Error;

use crate::kind::SchemaKind;

/// A single validation failure.
///
/// `message` is the complete human-readable description, path included;
/// `instance_path` is kept separately for callers that want to locate the
/// failing field without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Structural path of the failing value. Empty for the root.
    pub instance_path: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl Violation {
    /// Create a violation at `instance_path`.
    pub fn new(instance_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instance_path: instance_path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Violation {}

/// Top-level error type for schema compilation and realization.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A string or sequence definition did not match its grammar, or a
    /// literal value segment failed to parse.
    #[error("malformed schema syntax: {reason}")]
    MalformedSchemaSyntax {
        /// What was wrong, including the offending input.
        reason: String,
    },

    /// `compile` received something that is neither a string, a sequence,
    /// a mapping nor a compiled node.
    #[error("unsupported schema definition, only string/array/object formats are accepted: {definition}")]
    UnsupportedSchemaDefinition {
        /// Plain rendering of the rejected definition.
        definition: String,
    },

    /// Data did not conform to a schema where conformance was required.
    #[error("schema validation failed, schema: ({title}), error: {violation}")]
    ValidationFailed {
        /// Title of the schema, empty when the schema has none.
        title: String,
        /// The first failure found (every alternative's, for `anyOf`).
        violation: Violation,
    },

    /// Merge was attempted against a schema that is neither an object nor
    /// an `anyOf`.
    #[error("merge only supports \"object\" or \"anyOf\" schemas, actual kind: {kind}")]
    UnsupportedMergeTarget {
        /// Kind of the schema the merge was attempted against.
        kind: SchemaKind,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {reason}")]
    Config {
        /// Reason the configuration was rejected.
        reason: String,
    },
}

impl SchemaError {
    /// Shorthand for a [`SchemaError::MalformedSchemaSyntax`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSchemaSyntax {
            reason: reason.into(),
        }
    }

    /// The violation carried by a validation failure, if any.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::ValidationFailed { violation, .. } => Some(violation),
            _ => None,
        }
    }
}
