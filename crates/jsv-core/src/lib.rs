//! # jsv-core: Foundational Types for jsv
//!
//! Defines the value types shared by the schema engine and the command-line
//! host. Depends on nothing internal.
//!
//! ## Modules
//!
//! - [`message`]: `ValidationMessage` and the insertion-ordered
//!   `ValidationMessages` set used for strict/lenient reconciliation.
//! - [`loader`]: reads JSON and YAML files into `serde_json::Value` trees.
//! - [`config`]: the validation configuration model (schema path, document
//!   paths, `strict`, `meta_validation`, schema mappings).
//! - [`error`]: load and configuration errors.
//!
//! ## Crate Policy
//!
//! - No `.unwrap()` outside tests.
//! - Documents and schemas are always `serde_json::Value`; YAML input is
//!   converted on load.

pub mod config;
pub mod error;
pub mod loader;
pub mod message;

pub use config::{Validation, ValidationConfig};
pub use error::{ConfigError, LoadError};
pub use loader::{load_json_node, DocumentFormat};
pub use message::{ValidationMessage, ValidationMessages};
