//! # Check Subcommand
//!
//! Compiles a schema definition and prints its normalized JSON form,
//! flagged `__raw` so the output loads back as an equivalent schema. Useful
//! for expanding type expressions and inferred `required` lists.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use ijs_schema::{SchemaEngine, RAW_KEY};
use serde_json::Value;

use crate::document::load_schema;
use crate::write_json;

/// Arguments for the `ijs check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema definition file (JSON or YAML).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, engine: &SchemaEngine, out: &mut dyn Write) -> Result<u8> {
    let schema = load_schema(engine, &args.schema)?;
    let mut normalized = schema.to_json();
    if let Value::Object(map) = &mut normalized {
        map.insert(RAW_KEY.into(), Value::Bool(true));
    }
    write_json(out, &normalized)?;
    Ok(0)
}
