use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse document: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid schema type {found} at {pointer}")]
    InvalidType { pointer: String, found: String },
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to prepare output directory {}: {source}", .path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{location} is not an object")]
    NotAnObject { location: String },

    #[error("failed to serialize {location}: {source}")]
    Serialize {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// A failure after the document was loaded. The run stops extracting but keeps
/// whatever was already written.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),

    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
}

/// A failure that ends the run before any schema is written.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Prepare(#[from] EmitError),
}
