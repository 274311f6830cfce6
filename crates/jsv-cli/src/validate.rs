//! # Validate Subcommand
//!
//! Runs validation batches, either from a YAML config file or from a
//! single ad-hoc batch described by flags.
//!
//! ```bash
//! jsv validate --config jsv.yaml
//! jsv validate --schema app.schema.json --strict a.json b.yaml
//! jsv validate --schema app.schema.json --map https://localhost/=schemas a.json
//! jsv validate --config jsv.yaml --report build/jsv-report.json
//! ```
//!
//! Exit code 0 when every batch ran and every document passed, 1 otherwise.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use jsv_core::{Validation, ValidationConfig};
use jsv_schema::{JsonSchemaEvaluator, RunReport, SchemaValidator};

use crate::resolve_path;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Validation config file (YAML).
    #[arg(long, conflicts_with = "schema")]
    pub config: Option<PathBuf>,

    /// Schema for an ad-hoc batch.
    #[arg(long, required_unless_present = "config")]
    pub schema: Option<PathBuf>,

    /// Documents to validate against --schema.
    #[arg(requires = "schema")]
    pub files: Vec<PathBuf>,

    /// Fail on properties an object schema does not declare. Applies to
    /// every batch when used with --config.
    #[arg(long)]
    pub strict: bool,

    /// Skip the meta-schema check. Applies to every batch when used with
    /// --config.
    #[arg(long)]
    pub no_meta_validation: bool,

    /// Resolve `$ref`s under a URI prefix from a local directory. Repeatable.
    #[arg(long = "map", value_name = "PREFIX=DIR", value_parser = parse_mapping)]
    pub mappings: Vec<(String, PathBuf)>,

    /// Write the run report as JSON to this file.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

/// Parse a `PREFIX=DIR` schema mapping.
pub fn parse_mapping(s: &str) -> Result<(String, PathBuf), String> {
    let (prefix, dir) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid mapping '{s}': expected PREFIX=DIR"))?;
    if prefix.is_empty() || dir.is_empty() {
        return Err(format!("invalid mapping '{s}': expected PREFIX=DIR"));
    }
    Ok((prefix.to_string(), PathBuf::from(dir)))
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, base: &Path) -> Result<u8> {
    let (mut mappings, mut validations) = match (&args.config, &args.schema) {
        (Some(config), _) => {
            let path = resolve_path(config, base);
            let config = ValidationConfig::load(&path)
                .with_context(|| format!("loading config: {}", path.display()))?;
            (
                config.schema_mappings.into_iter().collect::<Vec<_>>(),
                config.validations,
            )
        }
        (None, Some(schema)) => {
            let validation = Validation::new(resolve_path(schema, base))
                .with_documents(args.files.iter().map(|f| resolve_path(f, base)));
            (Vec::new(), vec![validation])
        }
        (None, None) => anyhow::bail!("either --config or --schema is required"),
    };

    for validation in &mut validations {
        if args.strict {
            validation.strict = true;
        }
        if args.no_meta_validation {
            validation.meta_validation = false;
        }
    }
    mappings.extend(
        args.mappings
            .iter()
            .map(|(prefix, dir)| (prefix.clone(), resolve_path(dir, base))),
    );

    tracing::debug!(
        batches = validations.len(),
        mappings = mappings.len(),
        "starting validation run"
    );

    let validator = SchemaValidator::new(JsonSchemaEvaluator::new().with_mappings(mappings));
    let run = validator.run_all(&validations);
    print_summary(&run);

    if let Some(report) = &args.report {
        let path = resolve_path(report, base);
        let json = serde_json::to_string_pretty(&run).context("serializing run report")?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing report: {}", path.display()))?;
        tracing::info!("run report written to {}", path.display());
    }

    Ok(if run.is_success() { 0 } else { 1 })
}

fn print_summary(run: &RunReport) {
    for batch in &run.batches {
        match batch {
            Ok(report) => {
                for (_, failure) in report.failures() {
                    eprintln!("FAIL: {failure}");
                }
            }
            Err(e) => eprintln!("ABORTED: {e}"),
        }
    }
    let warnings: usize = run
        .batches
        .iter()
        .filter_map(|b| b.as_ref().ok())
        .map(|b| b.warning_count())
        .sum();
    if run.is_success() {
        println!(
            "OK: {} files processed, {} warnings",
            run.processed(),
            warnings
        );
    } else {
        println!(
            "FAILED: {} files processed, {} failures, {} warnings",
            run.processed(),
            run.failure_count(),
            warnings
        );
    }
}
