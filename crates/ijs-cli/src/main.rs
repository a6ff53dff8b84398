//! # ijs CLI entry point
//!
//! Parses command-line arguments, builds the schema engine from the global
//! flags and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ijs_cli::check::{run_check, CheckArgs};
use ijs_cli::engine::EngineArgs;
use ijs_cli::realize::{run_merge, run_realize, MergeArgs, RealizeArgs};
use ijs_cli::validate::{run_validate, ValidateArgs};

/// Compile, validate and realize immutable JSON schemas.
#[derive(Parser, Debug)]
#[command(name = "ijs", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a schema definition and print its normalized form.
    Check(CheckArgs),

    /// Validate documents against a schema.
    Validate(ValidateArgs),

    /// Print the immutable projection of a document.
    Realize(RealizeArgs),

    /// Overlay a patch on a realized document.
    Merge(MergeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let engine = match cli.engine.build_engine() {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = match &cli.command {
        Commands::Check(args) => run_check(args, &engine, &mut out),
        Commands::Validate(args) => run_validate(args, &engine, &mut out),
        Commands::Realize(args) => run_realize(args, &engine, &mut out),
        Commands::Merge(args) => run_merge(args, &engine, &mut out),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_check() {
        let cli = Cli::try_parse_from(["ijs", "check", "s.yaml"]).unwrap();
        if let Commands::Check(args) = cli.command {
            assert_eq!(args.schema, PathBuf::from("s.yaml"));
        } else {
            panic!("expected check");
        }
        assert_eq!(cli.verbose, 0);
        assert!(!cli.engine.no_default_required);
    }

    #[test]
    fn cli_parse_validate_many_documents() {
        let cli = Cli::try_parse_from(["ijs", "validate", "s.json", "a.json", "b.yaml"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.documents.len(), 2);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_requires_document() {
        assert!(Cli::try_parse_from(["ijs", "validate", "s.json"]).is_err());
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ijs",
            "realize",
            "s.json",
            "d.json",
            "-vv",
            "--no-default-required",
            "--deep-record-validation",
            "--config",
            "ijs.yaml",
            "--log-json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert!(cli.engine.no_default_required);
        assert!(cli.engine.deep_record_validation);
        assert_eq!(cli.engine.config, Some(PathBuf::from("ijs.yaml")));
        assert!(matches!(cli.command, Commands::Realize(_)));
    }

    #[test]
    fn cli_parse_merge() {
        let cli = Cli::try_parse_from(["ijs", "merge", "s.json", "d.json", "p.json"]).unwrap();
        if let Commands::Merge(args) = cli.command {
            assert_eq!(args.patch, PathBuf::from("p.json"));
        } else {
            panic!("expected merge");
        }
    }

    #[test]
    fn cli_parse_unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["ijs", "lint", "s.json"]).is_err());
    }
}
