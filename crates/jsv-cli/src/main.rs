//! # jsv CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jsv_cli::audit::{run_audit, AuditArgs};
use jsv_cli::strictify::{run_strictify, StrictifyArgs};
use jsv_cli::validate::{run_validate, ValidateArgs};

/// JSON Schema validation with strict mode.
///
/// Validates JSON and YAML documents against JSON Schema. Strict mode
/// rejects properties that an object schema does not declare; lenient mode
/// reports them as warnings.
#[derive(Parser, Debug)]
#[command(name = "jsv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate documents against their schemas.
    Validate(ValidateArgs),

    /// Print the strict variant of a schema.
    Strictify(StrictifyArgs),

    /// List object schemas that accept undeclared properties.
    Audit(AuditArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    tracing::debug!("jsv CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &base),
        Commands::Strictify(args) => run_strictify(&args, &base),
        Commands::Audit(args) => run_audit(&args, &base),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
