//! # Validation Configuration
//!
//! Describes what to validate. A configuration holds any number of
//! [`Validation`] entries; each entry names one schema and the documents
//! checked against it, together with the `strict` and `meta_validation`
//! flags.
//!
//! ```yaml
//! schema_mappings:
//!   "https://localhost/": schemas/
//! validations:
//!   - json_schema: schemas/app.schema.json
//!     json_files: [conf/a.json, conf/b.yaml]
//!   - strict: true
//!     json_schema: schemas/app.schema.json
//!     json_file: conf/extra.json
//! ```
//!
//! Relative paths are resolved against the directory of the configuration
//! file by [`ValidationConfig::load`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// URI prefix -> local directory used to resolve remote `$ref`s.
    pub schema_mappings: BTreeMap<String, PathBuf>,
    /// Validation entries, executed in order.
    pub validations: Vec<Validation>,
}

/// One validation entry: a schema and the documents validated against it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Validation {
    /// Schema file. Entries without a schema are skipped.
    pub json_schema: Option<PathBuf>,
    /// A single document file, validated after `json_files`.
    pub json_file: Option<PathBuf>,
    /// Document files.
    pub json_files: Vec<PathBuf>,
    /// Fail on any property not declared by an object schema.
    pub strict: bool,
    /// Check the schema against its meta-schema before validating documents.
    pub meta_validation: bool,
}

impl Default for Validation {
    fn default() -> Self {
        Self {
            json_schema: None,
            json_file: None,
            json_files: Vec::new(),
            strict: false,
            meta_validation: true,
        }
    }
}

impl Validation {
    /// Create an entry for `schema` with default flags.
    pub fn new(schema: impl Into<PathBuf>) -> Self {
        Self {
            json_schema: Some(schema.into()),
            ..Self::default()
        }
    }

    /// Builder-style document list.
    pub fn with_documents<I, P>(mut self, documents: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.json_files = documents.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style strict flag.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Builder-style meta-validation flag.
    pub fn meta_validation(mut self, meta_validation: bool) -> Self {
        self.meta_validation = meta_validation;
        self
    }

    /// The schema path, treating an empty path as unset.
    pub fn schema(&self) -> Option<&Path> {
        self.json_schema
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// All document paths: `json_files` followed by `json_file`.
    pub fn documents(&self) -> Vec<PathBuf> {
        self.json_files
            .iter()
            .chain(self.json_file.iter())
            .filter(|p| !p.as_os_str().is_empty())
            .cloned()
            .collect()
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() && !p.as_os_str().is_empty() {
                *p = base.join(&*p);
            }
        };
        if let Some(p) = self.json_schema.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.json_file.as_mut() {
            resolve(p);
        }
        self.json_files.iter_mut().for_each(resolve);
    }
}

impl ValidationConfig {
    /// Parse a configuration from YAML text. Paths are kept as written.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Invalid {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }

    /// Load a configuration file and resolve relative paths against its
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = serde_yaml::from_str(&text).map_err(|e| ConfigError::Invalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);
        Ok(config)
    }

    /// Resolve every relative path in the configuration against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for dir in self.schema_mappings.values_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        for validation in &mut self.validations {
            validation.resolve_paths(base);
        }
    }
}
