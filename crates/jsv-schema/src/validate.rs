//! # Validation Orchestrator
//!
//! Runs configured validations. Each [`Validation`] entry is a batch: one
//! schema and the documents checked against it.
//!
//! ## Two-Pass Evaluation
//!
//! Every document is first validated against the strict variant of the
//! schema (see [`crate::strict`]).
//!
//! - With [`Enforcement::Strict`] any strict message fails the document and
//!   no second pass runs.
//! - With [`Enforcement::Lenient`] the document is validated again against
//!   the schema as written. Lenient messages fail the document. Strict
//!   messages that the lenient pass did not also produce are reported as
//!   warnings, whatever the lenient verdict.
//!
//! The merge is the pure function [`reconcile`].
//!
//! ## Caching
//!
//! Schemas are loaded and compiled once per path and kept for the lifetime
//! of the [`SchemaValidator`]. Each path has its own cache slot, so loading
//! one schema never waits on another. A failed load leaves the slot empty
//! and the next request retries it. The strict variant is derived and compiled on
//! first use, at most once per schema even with concurrent callers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsv_core::{load_json_node, LoadError, Validation, ValidationMessages};
use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::evaluator::{CompiledSchema, JsonSchemaEvaluator, SchemaError, SchemaEvaluator};
use crate::strict::force_additional_properties;

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// How undeclared properties are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    /// Undeclared properties fail the document.
    Strict,
    /// Undeclared properties are reported as warnings.
    Lenient,
}

impl Enforcement {
    /// Map a configuration `strict` flag.
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Lenient
        }
    }
}

/// The verdict for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No message failed the document.
    Pass,
    /// Strict enforcement failed with these messages.
    StrictFailure(ValidationMessages),
    /// The schema as written failed with these messages.
    LenientFailure(ValidationMessages),
}

/// Verdict plus warnings for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Pass or the failing messages.
    pub verdict: Verdict,
    /// Strict-only messages, reported without failing the document.
    pub warnings: ValidationMessages,
}

impl Evaluation {
    /// Returns true if the verdict is [`Verdict::Pass`].
    pub fn is_pass(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

/// Merge the strict and lenient results for one document.
///
/// `lenient` is ignored under [`Enforcement::Strict`].
pub fn reconcile(
    enforcement: Enforcement,
    strict: ValidationMessages,
    lenient: ValidationMessages,
) -> Evaluation {
    match enforcement {
        Enforcement::Strict => Evaluation {
            verdict: if strict.is_empty() {
                Verdict::Pass
            } else {
                Verdict::StrictFailure(strict)
            },
            warnings: ValidationMessages::new(),
        },
        Enforcement::Lenient => {
            let warnings = strict.difference(&lenient);
            let verdict = if lenient.is_empty() {
                Verdict::Pass
            } else {
                Verdict::LenientFailure(lenient)
            };
            Evaluation { verdict, warnings }
        }
    }
}

// ---------------------------------------------------------------------------
// Errors and reports
// ---------------------------------------------------------------------------

/// A batch could not run: its schema is unusable.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The schema file could not be read or parsed.
    #[error("cannot load schema: {0}")]
    SchemaLoad(#[from] LoadError),

    /// The schema failed its meta-schema check or did not compile.
    #[error("schema '{schema}' is unusable: {source}")]
    Schema {
        /// Schema path.
        schema: String,
        /// Meta-schema or compilation failure.
        #[source]
        source: SchemaError,
    },
}

/// A document failed.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document could not be read or parsed.
    #[error("{0}")]
    Load(#[from] LoadError),

    /// Strict enforcement found violations.
    #[error("File: {path} - strict validation failed:\n{messages}")]
    StrictValidation {
        /// Document path.
        path: String,
        /// Messages from the strict pass.
        messages: ValidationMessages,
    },

    /// The schema as written found violations.
    #[error("File: {path} - validation failed:\n{messages}")]
    LenientValidation {
        /// Document path.
        path: String,
        /// Messages from the lenient pass.
        messages: ValidationMessages,
    },

    /// The strict variant of the schema could not be compiled.
    #[error("File: {path} - schema '{schema}' is unusable: {source}")]
    Schema {
        /// Document path.
        path: String,
        /// Schema path.
        schema: String,
        /// Compilation failure.
        #[source]
        source: SchemaError,
    },
}

/// Result of one document.
///
/// Serializes with the failure rendered as an `error` string, `null` on
/// success.
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    /// Document path.
    pub path: PathBuf,
    /// `Ok` when the document passed.
    #[serde(rename = "error", serialize_with = "serialize_outcome")]
    pub outcome: Result<(), DocumentError>,
    /// Strict-only messages under lenient enforcement.
    pub warnings: ValidationMessages,
}

impl DocumentReport {
    /// Returns true if the document passed.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Result of one batch that ran.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    /// Schema path, unset when the batch was skipped for lack of one.
    pub schema: Option<PathBuf>,
    /// Number of documents attempted.
    pub processed: usize,
    /// True when the batch had documents but no schema.
    pub skipped: bool,
    /// Per-document results, in configuration order.
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    /// Returns true if every document passed.
    pub fn is_success(&self) -> bool {
        self.documents.iter().all(DocumentReport::is_success)
    }

    /// Every failed document with its error.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &DocumentError)> {
        self.documents
            .iter()
            .filter_map(|d| d.outcome.as_ref().err().map(|e| (d.path.as_path(), e)))
    }

    /// Total number of warnings across documents.
    pub fn warning_count(&self) -> usize {
        self.documents.iter().map(|d| d.warnings.len()).sum()
    }
}

/// Result of a whole run: one entry per configured batch, in order.
///
/// Serializes each batch as `{"completed": {..}}` or
/// `{"aborted": {"error": ".."}}`.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// `Err` for a batch whose schema was unusable.
    #[serde(serialize_with = "serialize_batches")]
    pub batches: Vec<Result<BatchReport, BatchError>>,
}

impl RunReport {
    /// Returns true if no batch aborted and every document passed.
    pub fn is_success(&self) -> bool {
        self.batches
            .iter()
            .all(|b| b.as_ref().is_ok_and(BatchReport::is_success))
    }

    /// Documents attempted across all batches that ran.
    pub fn processed(&self) -> usize {
        self.batches
            .iter()
            .filter_map(|b| b.as_ref().ok())
            .map(|b| b.processed)
            .sum()
    }

    /// Aborted batches plus failed documents.
    pub fn failure_count(&self) -> usize {
        self.batches
            .iter()
            .map(|b| match b {
                Ok(report) => report.failures().count(),
                Err(_) => 1,
            })
            .sum()
    }
}

fn serialize_outcome<S: Serializer>(
    outcome: &Result<(), DocumentError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match outcome {
        Ok(()) => serializer.serialize_none(),
        Err(e) => serializer.serialize_some(&e.to_string()),
    }
}

fn serialize_batches<S: Serializer>(
    batches: &[Result<BatchReport, BatchError>],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    #[serde(rename_all = "snake_case")]
    enum BatchEntry<'a> {
        Completed(&'a BatchReport),
        Aborted { error: String },
    }

    serializer.collect_seq(batches.iter().map(|batch| match batch {
        Ok(report) => BatchEntry::Completed(report),
        Err(e) => BatchEntry::Aborted {
            error: e.to_string(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Schema cache
// ---------------------------------------------------------------------------

/// A loaded schema with its compiled forms.
pub struct CachedSchema {
    path: PathBuf,
    canonical: Value,
    lenient: Arc<dyn CompiledSchema>,
    strict: Mutex<Option<Arc<dyn CompiledSchema>>>,
}

impl CachedSchema {
    /// Schema file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The schema as written.
    pub fn canonical(&self) -> &Value {
        &self.canonical
    }

    /// Compiled schema as written.
    pub fn lenient(&self) -> Arc<dyn CompiledSchema> {
        Arc::clone(&self.lenient)
    }

    /// Compiled strict variant, derived on first call.
    ///
    /// The lock is held while compiling so concurrent callers wait for the
    /// first compilation instead of repeating it.
    pub fn strict(
        &self,
        evaluator: &dyn SchemaEvaluator,
    ) -> Result<Arc<dyn CompiledSchema>, SchemaError> {
        let mut slot = self.strict.lock();
        if let Some(compiled) = slot.as_ref() {
            return Ok(Arc::clone(compiled));
        }
        tracing::debug!(schema = %self.path.display(), "compiling strict variant");
        let strict_schema = force_additional_properties(&self.canonical);
        let compiled: Arc<dyn CompiledSchema> = Arc::from(evaluator.compile(&strict_schema)?);
        *slot = Some(Arc::clone(&compiled));
        Ok(compiled)
    }
}

impl std::fmt::Debug for CachedSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSchema")
            .field("path", &self.path)
            .field("strict_compiled", &self.strict.lock().is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// One cache entry. Empty until the first successful load of its path.
type SchemaSlot = Arc<Mutex<Option<Arc<CachedSchema>>>>;

/// Runs validation batches against a schema engine.
pub struct SchemaValidator<E = JsonSchemaEvaluator> {
    evaluator: E,
    cache: Mutex<HashMap<PathBuf, SchemaSlot>>,
}

impl Default for SchemaValidator<JsonSchemaEvaluator> {
    fn default() -> Self {
        Self::new(JsonSchemaEvaluator::new())
    }
}

impl<E: SchemaEvaluator> SchemaValidator<E> {
    /// Create an orchestrator over `evaluator` with an empty cache.
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The schema engine.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Number of cached schemas.
    pub fn cached_schema_count(&self) -> usize {
        let slots: Vec<SchemaSlot> = self.cache.lock().values().cloned().collect();
        slots.iter().filter(|slot| slot.lock().is_some()).count()
    }

    /// Load, optionally meta-check, and compile the schema at `path`,
    /// reusing the cached copy when present.
    ///
    /// The meta-schema check runs on every call that asks for it, so a
    /// batch with `meta_validation` still checks a schema that an earlier
    /// batch loaded without it.
    pub fn load_schema(
        &self,
        path: &Path,
        meta_validation: bool,
    ) -> Result<Arc<CachedSchema>, BatchError> {
        // The map lock only covers the slot lookup; loading holds the slot
        // lock, so different schemas load in parallel.
        let entry = Arc::clone(self.cache.lock().entry(path.to_path_buf()).or_default());
        let mut slot = entry.lock();
        if let Some(cached) = slot.as_ref().map(Arc::clone) {
            drop(slot);
            if meta_validation {
                self.check_meta_schema(path, &cached.canonical)?;
            }
            return Ok(cached);
        }

        let canonical = load_json_node(path)?;
        if meta_validation {
            self.check_meta_schema(path, &canonical)?;
        }
        let lenient = self
            .evaluator
            .compile(&canonical)
            .map_err(|source| BatchError::Schema {
                schema: path.display().to_string(),
                source,
            })?;
        let cached = Arc::new(CachedSchema {
            path: path.to_path_buf(),
            canonical,
            lenient: Arc::from(lenient),
            strict: Mutex::new(None),
        });
        *slot = Some(Arc::clone(&cached));
        Ok(cached)
    }

    fn check_meta_schema(&self, path: &Path, schema: &Value) -> Result<(), BatchError> {
        self.evaluator
            .check_meta_schema(schema)
            .map_err(|messages| BatchError::Schema {
                schema: path.display().to_string(),
                source: SchemaError::MetaSchema { messages },
            })
    }

    /// Evaluate one already-parsed document against `schema`.
    pub fn evaluate(
        &self,
        schema: &CachedSchema,
        document: &Value,
        enforcement: Enforcement,
    ) -> Result<Evaluation, SchemaError> {
        let strict = schema.strict(&self.evaluator)?.validate(document);
        let lenient = match enforcement {
            Enforcement::Strict => ValidationMessages::new(),
            Enforcement::Lenient => schema.lenient.validate(document),
        };
        Ok(reconcile(enforcement, strict, lenient))
    }

    /// Load and evaluate the document at `path`, logging the outcome.
    pub fn evaluate_document(
        &self,
        schema: &CachedSchema,
        path: &Path,
        enforcement: Enforcement,
    ) -> DocumentReport {
        let file = path.display().to_string();
        tracing::debug!(
            "File: {} - validating against {}, strict={}",
            file,
            schema.path.display(),
            enforcement == Enforcement::Strict
        );

        let document = match load_json_node(path) {
            Ok(document) => document,
            Err(e) => {
                return DocumentReport {
                    path: path.to_path_buf(),
                    outcome: Err(DocumentError::Load(e)),
                    warnings: ValidationMessages::new(),
                }
            }
        };

        let evaluation = match self.evaluate(schema, &document, enforcement) {
            Ok(evaluation) => evaluation,
            Err(source) => {
                return DocumentReport {
                    path: path.to_path_buf(),
                    outcome: Err(DocumentError::Schema {
                        path: file,
                        schema: schema.path.display().to_string(),
                        source,
                    }),
                    warnings: ValidationMessages::new(),
                }
            }
        };

        if !evaluation.warnings.is_empty() {
            tracing::warn!(
                "File: {} - strict validation warnings:\n{}",
                file,
                evaluation.warnings
            );
        }

        let outcome = match evaluation.verdict {
            Verdict::Pass => {
                tracing::info!("File: {} - validated - Success", file);
                Ok(())
            }
            Verdict::StrictFailure(messages) => Err(DocumentError::StrictValidation {
                path: file,
                messages,
            }),
            Verdict::LenientFailure(messages) => Err(DocumentError::LenientValidation {
                path: file,
                messages,
            }),
        };

        DocumentReport {
            path: path.to_path_buf(),
            outcome,
            warnings: evaluation.warnings,
        }
    }

    /// Run one batch.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] when the schema cannot be loaded, fails its
    /// meta-schema check, or does not compile. No document is evaluated in
    /// that case. Document failures do not abort the batch; they are
    /// collected in the report.
    pub fn run_batch(&self, validation: &Validation) -> Result<BatchReport, BatchError> {
        let documents = validation.documents();
        if documents.is_empty() {
            tracing::warn!("No JSON files to validate");
            return Ok(BatchReport {
                schema: validation.schema().map(Path::to_path_buf),
                ..BatchReport::default()
            });
        }

        let Some(schema_path) = validation.schema() else {
            tracing::warn!(
                "No schema file given, skipping {} files",
                documents.len()
            );
            return Ok(BatchReport {
                skipped: true,
                ..BatchReport::default()
            });
        };

        let schema = self.load_schema(schema_path, validation.meta_validation)?;
        // Every document needs the strict variant; fail the batch early.
        schema
            .strict(&self.evaluator)
            .map_err(|source| BatchError::Schema {
                schema: schema_path.display().to_string(),
                source,
            })?;
        let enforcement = Enforcement::from_strict(validation.strict);

        let reports: Vec<DocumentReport> = documents
            .iter()
            .map(|doc| self.evaluate_document(&schema, doc, enforcement))
            .collect();

        let report = BatchReport {
            schema: Some(schema_path.to_path_buf()),
            processed: reports.len(),
            skipped: false,
            documents: reports,
        };

        let failures: Vec<&DocumentError> = report.failures().map(|(_, e)| e).collect();
        if failures.is_empty() {
            tracing::info!("Successfully processed {} files.", report.processed);
        } else {
            tracing::error!("Failed validating json files, {} failures", failures.len());
            for failure in failures {
                tracing::error!("{failure}");
            }
        }
        Ok(report)
    }

    /// Run every batch in order. An aborted batch does not stop later ones.
    pub fn run_all(&self, validations: &[Validation]) -> RunReport {
        let batches = validations
            .iter()
            .map(|validation| {
                let result = self.run_batch(validation);
                if let Err(e) = &result {
                    tracing::error!("{e}");
                }
                result
            })
            .collect();
        RunReport { batches }
    }
}
