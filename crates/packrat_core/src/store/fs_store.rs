//! Filesystem-backed vault document store.

use super::{normalize_document_path, DocumentStore, EntryKind, StoreError, StoreResult};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Document store rooted at a vault directory.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Creates a store for the vault at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a vault-relative identifier to an absolute filesystem path.
    pub fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        let normalized = normalize_document_path(path)?;
        Ok(normalized
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment)))
    }
}

fn io_error(path: &str, source: std::io::Error) -> StoreError {
    match source.kind() {
        ErrorKind::NotFound => StoreError::NotFound(path.to_string()),
        ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.to_string()),
        _ => StoreError::Io {
            path: path.to_string(),
            source,
        },
    }
}

impl DocumentStore for FsDocumentStore {
    fn read(&self, path: &str) -> StoreResult<String> {
        let target = self.resolve(path)?;
        if target.is_dir() {
            return Err(StoreError::NotADocument(path.to_string()));
        }
        std::fs::read_to_string(&target).map_err(|err| io_error(path, err))
    }

    fn write(&self, path: &str, text: &str) -> StoreResult<()> {
        let target = self.resolve(path)?;
        if target.is_dir() {
            return Err(StoreError::NotADocument(path.to_string()));
        }
        std::fs::write(&target, text).map_err(|err| io_error(path, err))
    }

    fn exists(&self, path: &str) -> StoreResult<Option<EntryKind>> {
        let target = self.resolve(path)?;
        match std::fs::metadata(&target) {
            Ok(meta) if meta.is_file() => Ok(Some(EntryKind::Document)),
            Ok(_) => Ok(Some(EntryKind::Folder)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(path, err)),
        }
    }

    fn create(&self, path: &str, initial_text: &str) -> StoreResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|err| io_error(path, err))?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|err| io_error(path, err))?;
        file.write_all(initial_text.as_bytes())
            .map_err(|err| io_error(path, err))
    }

    fn lock_key(&self, path: &str) -> String {
        match self.resolve(path) {
            Ok(target) => target.to_string_lossy().into_owned(),
            Err(_) => path.to_string(),
        }
    }
}
