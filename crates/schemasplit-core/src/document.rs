use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::LoadError;

/// Read a YAML or JSON document from disk.
pub fn load(path: &Path) -> Result<Value, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_str(&content)
}

/// Parse a YAML or JSON document. JSON is parsed as YAML.
pub fn from_str(input: &str) -> Result<Value, LoadError> {
    let document: Value = serde_yaml_ng::from_str(input)?;
    Ok(document)
}

/// Follow a dotted path like `components.schemas` through a document.
/// Numeric segments index into arrays.
pub fn lookup<'a>(document: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(document, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// A collection of definitions, either keyed by name or stored as an array.
#[derive(Debug, Clone, Copy)]
pub enum Collection<'a> {
    Named(&'a Map<String, Value>),
    /// Members carry their name in a `name` field.
    Indexed(&'a [Value]),
}

impl<'a> Collection<'a> {
    pub fn classify(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Collection::Named(map)),
            Value::Array(items) => Some(Collection::Indexed(items)),
            _ => None,
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, Collection::Indexed(_))
    }
}
