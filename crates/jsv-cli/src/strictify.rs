//! # Strictify Subcommand
//!
//! Prints (or writes) the strict variant of a schema: every object schema
//! without an `additionalProperties` policy gets `false`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use jsv_core::load_json_node;
use jsv_schema::force_additional_properties_in_place;

use crate::resolve_path;

/// Arguments for the strictify subcommand.
#[derive(Args, Debug)]
pub struct StrictifyArgs {
    /// Schema file (JSON or YAML).
    pub schema: PathBuf,

    /// Write the strict schema here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Execute the strictify subcommand.
pub fn run_strictify(args: &StrictifyArgs, base: &Path) -> Result<u8> {
    let schema_path = resolve_path(&args.schema, base);
    let mut schema = load_json_node(&schema_path)
        .with_context(|| format!("loading schema: {}", schema_path.display()))?;

    let locked = force_additional_properties_in_place(&mut schema);
    tracing::info!(
        schema = %schema_path.display(),
        locked = locked.len(),
        "derived strict schema"
    );

    let text = serde_json::to_string_pretty(&schema).context("serializing strict schema")?;
    match &args.out {
        Some(out) => {
            let out = resolve_path(out, base);
            std::fs::write(&out, format!("{text}\n"))
                .with_context(|| format!("writing strict schema: {}", out.display()))?;
            println!("wrote: {} ({} nodes locked)", out.display(), locked.len());
        }
        None => println!("{text}"),
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_strictify_writes_locked_schema() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("s.json"),
            r#"{"type": "object", "properties": {"inner": {"type": "object"}}}"#,
        )
        .unwrap();

        let args = StrictifyArgs {
            schema: PathBuf::from("s.json"),
            out: Some(PathBuf::from("strict.json")),
        };
        assert_eq!(run_strictify(&args, dir.path()).unwrap(), 0);

        let written = load_json_node(&dir.path().join("strict.json")).unwrap();
        assert_eq!(written["additionalProperties"], false);
        assert_eq!(written["properties"]["inner"]["additionalProperties"], false);
    }

    #[test]
    fn run_strictify_missing_schema_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = StrictifyArgs {
            schema: PathBuf::from("missing.json"),
            out: None,
        };
        let err = run_strictify(&args, dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("loading schema"));
    }
}
