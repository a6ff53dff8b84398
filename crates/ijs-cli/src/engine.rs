//! # Engine Options
//!
//! Global flags that shape the [`SchemaEngine`] every subcommand runs on.
//! Overrides from `--config` are applied first, then the flags.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ijs_core::{ConfigOverrides, SchemaConfig};
use ijs_schema::SchemaEngine;

/// Engine configuration flags, shared by all subcommands.
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// YAML or JSON file with `defaultRequired` / `shallowValidateImmutableRecord`
    /// overrides.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not make object properties required unless declared so.
    #[arg(long, global = true)]
    pub no_default_required: bool,

    /// Validate realized records field by field instead of by shape.
    #[arg(long, global = true)]
    pub deep_record_validation: bool,
}

impl EngineArgs {
    /// Resolve the configuration: defaults, then the file, then the flags.
    pub fn config(&self) -> Result<SchemaConfig> {
        let mut config = SchemaConfig::default();
        if let Some(path) = &self.config {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            let overrides = ConfigOverrides::from_yaml_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?;
            config = config.apply(&overrides);
        }
        config = config.apply(&ConfigOverrides {
            default_required: self.no_default_required.then_some(false),
            shallow_validate_immutable_record: self.deep_record_validation.then_some(false),
        });
        Ok(config)
    }

    pub fn build_engine(&self) -> Result<SchemaEngine> {
        let config = self.config()?;
        tracing::debug!(
            default_required = config.default_required,
            shallow_validate_immutable_record = config.shallow_validate_immutable_record,
            "engine configured"
        );
        Ok(SchemaEngine::with_config(config))
    }
}
