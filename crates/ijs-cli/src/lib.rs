//! # ijs-cli — Command-Line Front End
//!
//! Provides the `ijs` command-line interface over the schema engine.
//!
//! ## Subcommands
//!
//! - `ijs check` — Compile a definition and print the normalized schema.
//! - `ijs validate` — Validate documents against a schema.
//! - `ijs realize` — Print the immutable projection of a document.
//! - `ijs merge` — Overlay a patch on a realized document.
//!
//! ```bash
//! ijs check schemas/user.yaml
//! ijs validate schemas/user.yaml data/*.json
//! ijs --no-default-required realize schemas/user.yaml data/alice.json
//! ijs merge schemas/user.yaml data/alice.json patches/rename.json
//! ```
//!
//! ## Exit Codes
//!
//! `0` on success, `1` when a document does not conform, `2` on
//! operational errors (unreadable files, malformed schema definitions).

pub mod check;
pub mod document;
pub mod engine;
pub mod realize;
pub mod validate;

use std::io::Write;

use anyhow::{Context, Result};
use serde_json::Value;

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json(out: &mut dyn Write, value: &Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to serialize output")?;
    writeln!(out).context("failed to write output")?;
    Ok(())
}
