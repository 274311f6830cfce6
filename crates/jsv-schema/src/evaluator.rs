//! # Schema Evaluator
//!
//! The narrow seam between the orchestrator and the JSON Schema engine.
//! The orchestrator only ever needs three things from an engine: check a
//! schema against its meta-schema, compile a schema, and validate a document
//! with a compiled schema. [`SchemaEvaluator`] and [`CompiledSchema`] capture
//! exactly that, so another engine can be swapped in without touching the
//! transformer or the orchestrator.
//!
//! [`JsonSchemaEvaluator`] is the default engine, backed by the `jsonschema`
//! crate.
//!
//! ## Remote References
//!
//! Cross-schema `$ref`s are resolved through schema mappings: a URI prefix
//! (e.g. `https://localhost/`) mapped to a local directory. A reference to
//! `https://localhost/common/types.schema.json` is then read from
//! `<dir>/common/types.schema.json`. There is no network access; a remote
//! reference outside every mapping fails compilation.

use std::path::PathBuf;

use jsonschema::{Draft, Retrieve, Uri, ValidationOptions, Validator};
use jsv_core::{load_json_node, ValidationMessage, ValidationMessages};
use serde_json::Value;
use thiserror::Error;

/// A schema that cannot be used for validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema does not conform to its meta-schema.
    #[error("schema is not valid against its meta-schema:\n{messages}")]
    MetaSchema {
        /// Meta-schema violations.
        messages: ValidationMessages,
    },

    /// `$schema` names a draft the engine does not know.
    #[error("unknown meta-schema '{uri}'")]
    UnknownDraft {
        /// The `$schema` value as written.
        uri: String,
    },

    /// The engine rejected the schema.
    #[error("cannot compile schema: {reason}")]
    Compile {
        /// Engine diagnostic.
        reason: String,
    },
}

/// A compiled schema, ready to validate documents.
pub trait CompiledSchema: Send + Sync {
    /// Validate `document`. An empty result means the document is valid.
    fn validate(&self, document: &Value) -> ValidationMessages;
}

/// A JSON Schema engine.
pub trait SchemaEvaluator: Send + Sync {
    /// Check `schema` against the meta-schema it declares.
    fn check_meta_schema(&self, schema: &Value) -> Result<(), ValidationMessages>;

    /// Compile `schema` for repeated validation.
    fn compile(&self, schema: &Value) -> Result<Box<dyn CompiledSchema>, SchemaError>;
}

/// Default engine backed by the `jsonschema` crate.
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaEvaluator {
    mappings: Vec<(String, PathBuf)>,
}

impl JsonSchemaEvaluator {
    /// An evaluator without schema mappings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve references starting with `prefix` from files under `dir`.
    pub fn with_mapping(mut self, prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.mappings.push((prefix.into(), dir.into()));
        self
    }

    /// Add every `(prefix, dir)` pair of `mappings`.
    pub fn with_mappings<I, S, P>(self, mappings: I) -> Self
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<PathBuf>,
    {
        mappings
            .into_iter()
            .fold(self, |evaluator, (prefix, dir)| evaluator.with_mapping(prefix, dir))
    }

    fn build_options(&self, draft: Draft) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(draft);
        opts.with_retriever(MappedSchemaRetriever {
            mappings: self.mappings.clone(),
        });
        opts
    }

    /// A validator whose schema is the meta-schema of `draft`. The engine
    /// bundles every meta-schema, so the reference resolves offline.
    fn meta_validator(&self, draft: Draft) -> Result<Validator, String> {
        self.build_options(draft)
            .build(&serde_json::json!({ "$ref": meta_schema_uri(draft) }))
            .map_err(|e| e.to_string())
    }
}

impl SchemaEvaluator for JsonSchemaEvaluator {
    fn check_meta_schema(&self, schema: &Value) -> Result<(), ValidationMessages> {
        // The meta validator panics on an unknown `$schema`.
        let draft = detect_draft(schema).map_err(|uri| {
            std::iter::once(ValidationMessage::new(
                "/$schema",
                "",
                format!("unknown meta-schema '{uri}'"),
            ))
            .collect::<ValidationMessages>()
        })?;

        let messages: ValidationMessages = match self.meta_validator(draft) {
            Ok(meta) => meta.iter_errors(schema).map(|e| to_message(&e)).collect(),
            Err(reason) => {
                tracing::debug!(
                    %reason,
                    "meta-schema validator unavailable, reporting first violation only"
                );
                match jsonschema::meta::validate(schema) {
                    Ok(()) => ValidationMessages::new(),
                    Err(e) => std::iter::once(to_message(&e)).collect(),
                }
            }
        };
        if messages.is_empty() {
            Ok(())
        } else {
            Err(messages)
        }
    }

    fn compile(&self, schema: &Value) -> Result<Box<dyn CompiledSchema>, SchemaError> {
        let draft = detect_draft(schema).map_err(|uri| SchemaError::UnknownDraft { uri })?;
        let validator = self
            .build_options(draft)
            .build(schema)
            .map_err(|e| SchemaError::Compile {
                reason: e.to_string(),
            })?;
        Ok(Box::new(JsonSchemaCompiled { validator }))
    }
}

fn to_message(e: &jsonschema::ValidationError<'_>) -> ValidationMessage {
    ValidationMessage::new(
        e.instance_path.to_string(),
        e.schema_path.to_string(),
        e.to_string(),
    )
}

struct JsonSchemaCompiled {
    validator: Validator,
}

impl CompiledSchema for JsonSchemaCompiled {
    fn validate(&self, document: &Value) -> ValidationMessages {
        self.validator
            .iter_errors(document)
            .map(|e| to_message(&e))
            .collect()
    }
}

/// Resolves mapped remote references from local files.
struct MappedSchemaRetriever {
    mappings: Vec<(String, PathBuf)>,
}

impl MappedSchemaRetriever {
    fn local_path(&self, uri: &str) -> Option<PathBuf> {
        // Longest prefix wins.
        self.mappings
            .iter()
            .filter(|(prefix, _)| uri.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, dir)| {
                let rest = uri[prefix.len()..].split('#').next().unwrap_or("");
                dir.join(rest.trim_start_matches('/'))
            })
    }
}

impl Retrieve for MappedSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let path = self
            .local_path(uri_str)
            .ok_or_else(|| format!("no schema mapping for '{uri_str}'"))?;
        tracing::debug!(uri = uri_str, file = %path.display(), "resolving mapped schema");
        Ok(load_json_node(&path)?)
    }
}

/// Pick the draft named by `$schema`. A schema without `$schema` (or a
/// boolean schema) uses draft 2020-12. Only the canonical meta-schema URIs
/// are recognised.
///
/// # Errors
///
/// Returns the `$schema` value (as text) when it names no known draft.
pub fn detect_draft(schema: &Value) -> Result<Draft, String> {
    let uri = match schema.get("$schema") {
        None => return Ok(Draft::Draft202012),
        Some(Value::String(uri)) => uri,
        Some(other) => return Err(other.to_string()),
    };
    [
        Draft::Draft4,
        Draft::Draft6,
        Draft::Draft7,
        Draft::Draft201909,
        Draft::Draft202012,
    ]
    .into_iter()
    .find(|draft| meta_schema_uri(*draft) == uri)
    .ok_or_else(|| uri.clone())
}

/// Canonical meta-schema URI of `draft`.
fn meta_schema_uri(draft: Draft) -> &'static str {
    match draft {
        Draft::Draft4 => "http://json-schema.org/draft-04/schema#",
        Draft::Draft6 => "http://json-schema.org/draft-06/schema#",
        Draft::Draft7 => "http://json-schema.org/draft-07/schema#",
        Draft::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
        _ => "https://json-schema.org/draft/2020-12/schema",
    }
}
