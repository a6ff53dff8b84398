//! # ijs-core — Foundational Types for immutable-json-schema
//!
//! This crate is the leaf of the workspace. It defines the pieces every
//! other crate agrees on: which kinds of schema node exist, how the engine
//! is configured, and how failures are reported.
//!
//! ## Key Design Principles
//!
//! 1. **One kind enum.** [`SchemaKind`] lists the eight node kinds. Every
//!    `match` over it is exhaustive, so adding a kind forces every consumer
//!    to handle it.
//!
//! 2. **Configuration is a value.** [`SchemaConfig`] is passed to the engine
//!    that uses it. There is no process-wide mutable configuration; a running
//!    compile pass always sees one consistent snapshot.
//!
//! 3. **One error taxonomy.** [`SchemaError`] carries the four failure
//!    conditions of the compiler and realization engine. The validator never
//!    produces a `SchemaError` directly; it returns a [`Violation`] value.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ijs-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod kind;

// Re-export primary types for ergonomic imports.
pub use config::{ConfigOverrides, SchemaConfig};
pub use error::{SchemaError, Violation};
pub use kind::{SchemaKind, SCHEMA_KIND_COUNT};
