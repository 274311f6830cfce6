//! # jsv-cli: Command-Line Interface for jsv
//!
//! Provides the `jsv` binary.
//!
//! ## Subcommands
//!
//! - `jsv validate`: run validation batches from a config file or flags.
//! - `jsv strictify`: print the strict variant of a schema.
//! - `jsv audit`: list object schemas that accept undeclared properties.
//!
//! ```bash
//! jsv validate --config jsv.yaml
//! jsv validate --schema schemas/app.schema.json --strict conf/a.json conf/b.yaml
//! jsv strictify schemas/app.schema.json --out build/app.strict.schema.json
//! jsv audit schemas/app.schema.json
//! ```

pub mod audit;
pub mod strictify;
pub mod validate;

use std::path::{Path, PathBuf};

/// Resolve a path given on the command line.
///
/// Absolute paths are returned as-is; relative paths are joined to `base`.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
