//! # Realize and Merge Subcommands
//!
//! `realize` prints the immutable projection of a document: declared
//! properties only, with defaults filled in. `merge` realizes a base
//! document, overlays a patch object on it and prints the result.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use ijs_schema::{ImmutableValue, SchemaEngine, SchemaError};

use crate::document::{load_document, load_schema};
use crate::write_json;

/// Arguments for the `ijs realize` subcommand.
#[derive(Args, Debug)]
pub struct RealizeArgs {
    /// Schema definition file (JSON or YAML).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Document to realize.
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,
}

/// Arguments for the `ijs merge` subcommand.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Schema definition file (JSON or YAML).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Base document, realized before merging.
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Patch object overlaid on the base document.
    #[arg(value_name = "PATCH")]
    pub patch: PathBuf,
}

/// Execute the realize subcommand.
pub fn run_realize(args: &RealizeArgs, engine: &SchemaEngine, out: &mut dyn Write) -> Result<u8> {
    let schema = load_schema(engine, &args.schema)?;
    let document = load_document(&args.document)?;
    let realized = engine.create_immutable(&schema, &document);
    emit(out, realized)
}

/// Execute the merge subcommand.
pub fn run_merge(args: &MergeArgs, engine: &SchemaEngine, out: &mut dyn Write) -> Result<u8> {
    let schema = load_schema(engine, &args.schema)?;
    let document = load_document(&args.document)?;
    let patch = load_document(&args.patch)?;
    let Some(patch) = patch.as_object() else {
        bail!("patch {} must be a JSON object", args.patch.display());
    };

    let existing = match engine.create_immutable(&schema, &document) {
        Ok(existing) => existing,
        Err(e) => return emit(out, Err(e)),
    };
    let merged = engine.merge_immutable(&schema, &existing, patch);
    emit(out, merged)
}

/// Print a realized value, or the violation when the data did not
/// conform. Other errors propagate.
fn emit(out: &mut dyn Write, result: Result<ImmutableValue, SchemaError>) -> Result<u8> {
    match result {
        Ok(value) => {
            write_json(out, &value.to_plain())?;
            Ok(0)
        }
        Err(e @ SchemaError::ValidationFailed { .. }) => {
            writeln!(out, "FAIL: {e}").context("failed to write output")?;
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}
