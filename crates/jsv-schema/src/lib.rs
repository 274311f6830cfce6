//! # jsv-schema: Strict-Mode Schema Validation
//!
//! Validates JSON and YAML documents against JSON Schema with an optional
//! strict mode that rejects properties an object schema does not declare.
//!
//! - [`walk`]: pre-order traversal of object nodes in a JSON tree.
//! - [`strict`]: derives the strict variant of a schema by locking
//!   `additionalProperties`, and audits open object schemas.
//! - [`evaluator`]: the schema engine seam, with a `jsonschema`-backed
//!   default that resolves remote references from local directories.
//! - [`validate`]: the orchestrator. Runs batches of documents through the
//!   strict and lenient passes and reconciles the results.
//!
//! ## Usage
//!
//! ```ignore
//! use jsv_core::Validation;
//! use jsv_schema::SchemaValidator;
//!
//! let validator = SchemaValidator::default();
//! let report = validator.run_batch(
//!     &Validation::new("schemas/app.schema.json").with_documents(["conf/app.json"]),
//! )?;
//! assert!(report.is_success());
//! ```

pub mod evaluator;
pub mod strict;
pub mod validate;
pub mod walk;

pub use evaluator::{CompiledSchema, JsonSchemaEvaluator, SchemaError, SchemaEvaluator};
pub use strict::{
    audit_additional_properties, force_additional_properties,
    force_additional_properties_in_place, AdditionalPropertiesFinding,
};
pub use validate::{
    reconcile, BatchError, BatchReport, CachedSchema, DocumentError, DocumentReport,
    Enforcement, Evaluation, RunReport, SchemaValidator, Verdict,
};
pub use walk::{walk, walk_mut, ROOT_LABEL};
