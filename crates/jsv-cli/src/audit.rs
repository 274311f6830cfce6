//! # Audit Subcommand
//!
//! Lists object schemas that accept properties they do not declare, either
//! because `additionalProperties` is absent or because it is `true`.
//! Findings are informational; the exit code is 0 either way.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use jsv_core::load_json_node;
use jsv_schema::audit_additional_properties;

use crate::resolve_path;

/// Arguments for the audit subcommand.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Schema file (JSON or YAML).
    pub schema: PathBuf,
}

/// Execute the audit subcommand.
pub fn run_audit(args: &AuditArgs, base: &Path) -> Result<u8> {
    let schema_path = resolve_path(&args.schema, base);
    let schema = load_json_node(&schema_path)
        .with_context(|| format!("loading schema: {}", schema_path.display()))?;

    let findings = audit_additional_properties(&schema);
    if findings.is_empty() {
        println!("{}: no open object schemas", schema_path.display());
        return Ok(0);
    }

    println!("{}:", schema_path.display());
    for finding in &findings {
        println!("  {finding}");
    }
    println!();
    println!("Total: {} findings", findings.len());
    Ok(0)
}
