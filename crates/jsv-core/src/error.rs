//! # Error Types
//!
//! Errors raised while reading documents, schemas and configuration files.
//! Validation failures are not errors at this layer: they are carried as
//! [`ValidationMessages`](crate::ValidationMessages) and classified by the
//! orchestrator in `jsv-schema`.

use thiserror::Error;

use crate::loader::DocumentFormat;

/// A document or schema file could not be loaded.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file is missing or unreadable.
    #[error("cannot read file '{path}': {source}")]
    Read {
        /// Path of the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not well-formed.
    #[error("failed to parse {format} from file '{path}': {reason}")]
    Parse {
        /// Path of the file.
        path: String,
        /// Format the file was parsed as.
        format: DocumentFormat,
        /// Parser diagnostic.
        reason: String,
    },
}

impl LoadError {
    /// Path of the file that failed to load.
    pub fn path(&self) -> &str {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

/// The validation configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file is missing or unreadable.
    #[error("cannot read config '{path}': {source}")]
    Read {
        /// Path of the configuration file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid YAML or does not match the model.
    #[error("invalid config '{path}': {reason}")]
    Invalid {
        /// Path of the configuration file, or `<inline>`.
        path: String,
        /// Deserializer diagnostic.
        reason: String,
    },
}
