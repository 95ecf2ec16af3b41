use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EmitError;

/// Destination for finalized schema documents.
pub trait SchemaSink {
    /// Write `payload` to `<subdir>/<stem>.json`, replacing any existing file.
    /// Returns the path written, relative to the sink's root.
    fn emit(&mut self, subdir: &Path, stem: &str, payload: &str) -> Result<PathBuf, EmitError>;
}

/// Relative location of a schema file inside the output tree.
pub fn schema_path(subdir: &Path, stem: &str) -> PathBuf {
    subdir.join(format!("{stem}.json"))
}

/// Output directory owned by one run.
#[derive(Debug)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Wipe `root` and recreate it empty.
    pub fn prepare(root: impl Into<PathBuf>) -> Result<Self, EmitError> {
        let root = root.into();
        if root.exists() {
            fs::remove_dir_all(&root).map_err(|source| EmitError::Prepare {
                path: root.clone(),
                source,
            })?;
        }
        fs::create_dir_all(&root).map_err(|source| EmitError::Prepare {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SchemaSink for OutputDir {
    fn emit(&mut self, subdir: &Path, stem: &str, payload: &str) -> Result<PathBuf, EmitError> {
        let dir = self.root.join(subdir);
        fs::create_dir_all(&dir).map_err(|source| EmitError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        let relative = schema_path(subdir, stem);
        let path = self.root.join(&relative);
        fs::write(&path, payload).map_err(|source| EmitError::Write { path, source })?;
        Ok(relative)
    }
}

/// In-memory sink, keyed by relative path.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn files(&self) -> &BTreeMap<PathBuf, String> {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SchemaSink for MemorySink {
    fn emit(&mut self, subdir: &Path, stem: &str, payload: &str) -> Result<PathBuf, EmitError> {
        let relative = schema_path(subdir, stem);
        self.files.insert(relative.clone(), payload.to_string());
        Ok(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_wipes_existing_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("out");
        fs::create_dir_all(root.join("stale")).unwrap();
        fs::write(root.join("stale/old.json"), "{}").unwrap();

        let out = OutputDir::prepare(&root).unwrap();
        assert_eq!(out.root(), root.as_path());
        assert!(root.is_dir());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn test_prepare_creates_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("a/b/c");
        OutputDir::prepare(&root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_emit_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let mut out = OutputDir::prepare(tmp.path().join("out")).unwrap();
        let written = out
            .emit(Path::new("widgets_{id}/get"), "widgets_{id}_query_parameters", "{}")
            .unwrap();
        assert_eq!(
            written,
            PathBuf::from("widgets_{id}/get/widgets_{id}_query_parameters.json")
        );
        assert_eq!(fs::read_to_string(out.root().join(&written)).unwrap(), "{}");
    }

    #[test]
    fn test_emit_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let mut out = OutputDir::prepare(tmp.path().join("out")).unwrap();
        let subdir = Path::new("components.schemas");
        out.emit(subdir, "Pet", "first").unwrap();
        let written = out.emit(subdir, "Pet", "second").unwrap();
        assert_eq!(
            fs::read_to_string(out.root().join(written)).unwrap(),
            "second"
        );
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.emit(Path::new("components.schemas"), "Pet", "a").unwrap();
        sink.emit(Path::new("components.schemas"), "Pet", "b").unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get("components.schemas/Pet.json"), Some("b"));
    }
}
