//! # Document Loader
//!
//! Reads schema and document files into `serde_json::Value` trees. The format
//! is chosen from the file extension: `.yaml`/`.yml` are parsed as YAML and
//! converted to the equivalent JSON value tree, everything else is parsed as
//! JSON.

use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;

/// Input format of a document or schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Yaml => f.write_str("YAML"),
        }
    }
}

/// Load a file into a JSON value tree.
///
/// # Errors
///
/// Returns [`LoadError::Read`] if the file cannot be read and
/// [`LoadError::Parse`] if it is not well-formed.
pub fn load_json_node(path: &Path) -> Result<Value, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let format = DocumentFormat::from_path(path);
    match parse_document(&content, format) {
        Ok(value) => {
            tracing::debug!("File: {} - parsing - Success", path.display());
            Ok(value)
        }
        Err(reason) => {
            tracing::error!("File: {} - parsing - Failure", path.display());
            Err(LoadError::Parse {
                path: path.display().to_string(),
                format,
                reason,
            })
        }
    }
}

/// Parse document text in the given format.
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Value, String> {
    match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| e.to_string())?;
            yaml_to_json_value(&yaml)
        }
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped; scalar keys (numbers, booleans) are stringified.
///
/// # Errors
///
/// A node with no JSON counterpart (a non-finite float, or a key that is not
/// a string, number or boolean) is reported with its JSON pointer, e.g.
/// `at '/servers/1/weight': float .nan has no JSON representation`.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    let mut pointer = String::new();
    convert_yaml(yaml, &mut pointer).map_err(|reason| {
        let at = if pointer.is_empty() { "/" } else { pointer.as_str() };
        format!("at '{at}': {reason}")
    })
}

/// `pointer` is left at the failing node on error.
fn convert_yaml(yaml: &serde_yaml::Value, pointer: &mut String) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => Value::Number(yaml_number(n)?),
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Tagged(tagged) => convert_yaml(&tagged.value, pointer)?,
        Yaml::Sequence(items) => {
            let mut array = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&index.to_string());
                array.push(convert_yaml(item, pointer)?);
                pointer.truncate(len);
            }
            Value::Array(array)
        }
        Yaml::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                let key = scalar_key(key)
                    .ok_or_else(|| "mapping key is not a string, number or boolean".to_string())?;
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
                let converted = convert_yaml(value, pointer)?;
                pointer.truncate(len);
                object.insert(key, converted);
            }
            Value::Object(object)
        }
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Result<serde_json::Number, String> {
    if let Some(i) = n.as_i64() {
        return Ok(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.into());
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .ok_or_else(|| format!("float {n} has no JSON representation"))
}

fn scalar_key(yaml: &serde_yaml::Value) -> Option<String> {
    match yaml {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => scalar_key(&tagged.value),
        _ => None,
    }
}
