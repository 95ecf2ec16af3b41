pub mod adapt;
pub mod components;
pub mod paths;

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value;

use crate::config::{BucketAssignment, SplitConfig};
use crate::emit::SchemaSink;
use crate::error::ExtractError;
use crate::naming::NameResolver;

pub use components::extract_components;
pub use paths::extract_paths;

/// Why an entry produced no file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The definition keyword points at nothing.
    MissingCollection,
    /// The value is neither an object nor an array.
    NotACollection,
    /// An array member has no string `name` field.
    MissingName,
    /// Nothing usable survived file name sanitization.
    EmptyFileName,
    /// A parameter has no string `name` field.
    MissingParameterName,
    /// A parameter's `in` is neither `query` nor `path`.
    UnsupportedLocation(String),
    /// A parameter `$ref` that was not followed, or that does not point at
    /// `components.parameters`.
    UnresolvedParameterRef(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingCollection => write!(f, "collection not found"),
            SkipReason::NotACollection => write!(f, "not an object or array"),
            SkipReason::MissingName => write!(f, "entry has no name"),
            SkipReason::EmptyFileName => write!(f, "name sanitizes to an empty file name"),
            SkipReason::MissingParameterName => write!(f, "parameter has no name"),
            SkipReason::UnsupportedLocation(location) => {
                write!(f, "parameter location '{location}' is not query or path")
            }
            SkipReason::UnresolvedParameterRef(target) => {
                write!(f, "parameter reference {target} does not resolve")
            }
        }
    }
}

/// One entry that was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub location: String,
    pub reason: SkipReason,
}

/// Files written and entries skipped during extraction.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Paths relative to the output root, in write order.
    pub written: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
}

/// Shared state for the extractors: naming, the sink, and the report.
pub struct ExtractContext<'a> {
    resolver: NameResolver,
    buckets: BucketAssignment,
    resolve_refs: bool,
    sink: &'a mut dyn SchemaSink,
    report: ExtractReport,
}

impl<'a> ExtractContext<'a> {
    pub fn new(config: &SplitConfig, sink: &'a mut dyn SchemaSink) -> Self {
        Self {
            resolver: NameResolver::new(&config.naming),
            buckets: config.parameters.buckets,
            resolve_refs: config.parameters.resolve_refs,
            sink,
            report: ExtractReport::default(),
        }
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub fn buckets(&self) -> BucketAssignment {
        self.buckets
    }

    pub fn resolve_refs(&self) -> bool {
        self.resolve_refs
    }

    /// Adapt `entry` under `name`, rewrite its references and write it to
    /// `<subdir>/<file name>.json`.
    pub fn write_schema(
        &mut self,
        subdir: &Path,
        name: &str,
        entry: &Value,
        location: &str,
    ) -> Result<(), ExtractError> {
        let Some(file_name) = self.resolver.resolve(name) else {
            self.skip(location, SkipReason::EmptyFileName);
            return Ok(());
        };
        let adapted = adapt::adapt_schema(entry, name, &file_name, location)?;
        let payload = adapt::finalize(&adapted, location)?;
        let written = self.sink.emit(subdir, &file_name, &payload)?;
        debug!("wrote {}", written.display());
        self.report.written.push(written);
        Ok(())
    }

    pub fn skip(&mut self, location: impl Into<String>, reason: SkipReason) {
        let location = location.into();
        debug!("skipped {location}: {reason}");
        self.report.skipped.push(Skipped { location, reason });
    }

    pub fn finish(self) -> ExtractReport {
        self.report
    }
}
