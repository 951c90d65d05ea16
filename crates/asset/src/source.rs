//! Byte sources the loader reads asset files from.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where asset bytes come from.
pub trait AssetSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError>;
}

/// Reads files relative to a root directory.
#[derive(Clone, Debug)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FileSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        let full = self.root.join(path);
        fs::read(&full).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(full),
            _ => SourceError::Io { path: full, source },
        })
    }
}

/// In-memory files, keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    pub fn with(mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl AssetSource for MemorySource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("hello.txt"), b"hi").expect("write");
        let source = FileSource::new(dir.path());
        assert_eq!(source.read(Path::new("hello.txt")).unwrap(), b"hi");
        assert!(matches!(
            source.read(Path::new("nope.txt")),
            Err(SourceError::NotFound(_))
        ));
    }

    #[test]
    fn memory_source_lookup() {
        let source = MemorySource::new().with("a.bin", vec![1, 2]);
        assert_eq!(source.read(Path::new("a.bin")).unwrap(), vec![1, 2]);
        assert!(source.read(Path::new("b.bin")).is_err());
    }
}
