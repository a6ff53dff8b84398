//! # Validate Subcommand
//!
//! Validates one or more documents against a compiled schema. Documents
//! are checked in the order given; the first failure stops the run.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ijs_schema::SchemaEngine;

use crate::document::{load_document, load_schema};

/// Arguments for the `ijs validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema definition file (JSON or YAML).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Documents to validate.
    #[arg(value_name = "DOCUMENT", required = true)]
    pub documents: Vec<PathBuf>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every document conforms, 1 at the first one
/// that does not.
pub fn run_validate(args: &ValidateArgs, engine: &SchemaEngine, out: &mut dyn Write) -> Result<u8> {
    let schema = load_schema(engine, &args.schema)?;

    for path in &args.documents {
        let document = load_document(path)?;
        match engine.validate(&schema, &document) {
            Ok(()) => {
                writeln!(out, "OK: {}", path.display()).context("failed to write output")?;
            }
            Err(violation) => {
                tracing::warn!(path = %path.display(), at = %violation.instance_path, "document does not conform");
                writeln!(out, "FAIL: {}", path.display()).context("failed to write output")?;
                writeln!(out, "  {violation}").context("failed to write output")?;
                return Ok(1);
            }
        }
    }

    tracing::info!(count = args.documents.len(), "all documents conform");
    Ok(0)
}
