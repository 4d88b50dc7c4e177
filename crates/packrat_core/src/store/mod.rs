//! Document store abstraction.
//!
//! # Responsibility
//! - Define the four capabilities the sweeper needs from a host note store:
//!   read, write, existence check, and create.
//! - Provide a filesystem vault store and an in-memory store.
//!
//! # Invariants
//! - Document identifiers are vault-relative, `/` separated paths.
//! - `write` overwrites the whole document.
//! - `create` never overwrites an existing entry.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fs_store;
pub mod memory_store;

pub use fs_store::FsDocumentStore;
pub use memory_store::MemoryDocumentStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Kind of entry found at a document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Plain text document.
    Document,
    /// Folder or any other non-document entry.
    Folder,
}

/// Document store errors.
#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    NotADocument(String),
    AlreadyExists(String),
    InvalidPath(String),
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "document not found: {path}"),
            Self::NotADocument(path) => write!(f, "not a document: {path}"),
            Self::AlreadyExists(path) => write!(f, "document already exists: {path}"),
            Self::InvalidPath(path) => write!(f, "invalid document path: `{path}`"),
            Self::Io { path, source } => write!(f, "{path}: {source}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Capability surface over the host's note storage.
pub trait DocumentStore {
    /// Reads the whole document as text.
    fn read(&self, path: &str) -> StoreResult<String>;
    /// Overwrites the whole document with `text`.
    fn write(&self, path: &str, text: &str) -> StoreResult<()>;
    /// Returns the kind of entry at `path`, or `None` when absent.
    fn exists(&self, path: &str) -> StoreResult<Option<EntryKind>>;
    /// Creates a new document with `initial_text`.
    fn create(&self, path: &str, initial_text: &str) -> StoreResult<()>;
    /// Returns the process-wide identity of a normalized document path.
    ///
    /// Sweeps on stores that map two paths to the same key are serialized.
    fn lock_key(&self, path: &str) -> String {
        path.to_string()
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn read(&self, path: &str) -> StoreResult<String> {
        (**self).read(path)
    }

    fn write(&self, path: &str, text: &str) -> StoreResult<()> {
        (**self).write(path, text)
    }

    fn exists(&self, path: &str) -> StoreResult<Option<EntryKind>> {
        (**self).exists(path)
    }

    fn create(&self, path: &str, initial_text: &str) -> StoreResult<()> {
        (**self).create(path, initial_text)
    }

    fn lock_key(&self, path: &str) -> String {
        (**self).lock_key(path)
    }
}

/// Normalizes a vault-relative document identifier.
///
/// Backslashes become `/`, empty and `.` segments are dropped.
///
/// # Errors
/// - Returns `InvalidPath` for empty, absolute, or `..`-containing paths.
pub fn normalize_document_path(path: &str) -> StoreResult<String> {
    let unified = path.trim().replace('\\', "/");
    if unified.starts_with('/') || unified.chars().nth(1) == Some(':') {
        return Err(StoreError::InvalidPath(path.to_string()));
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(StoreError::InvalidPath(path.to_string())),
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(segments.join("/"))
}

/// Returns the extension of a document identifier, without the dot.
pub fn document_extension(path: &str) -> Option<&str> {
    let name = path.rsplit(['/', '\\']).next()?;
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(extension)
}

#[cfg(test)]
mod tests {
    use super::{document_extension, normalize_document_path, StoreError};

    #[test]
    fn normalize_collapses_separators_and_dots() {
        assert_eq!(
            normalize_document_path(" notes\\daily/./today.md ").expect("valid path"),
            "notes/daily/today.md"
        );
        assert_eq!(
            normalize_document_path("archive.md").expect("valid path"),
            "archive.md"
        );
    }

    #[test]
    fn normalize_rejects_escaping_and_absolute_paths() {
        for bad in ["", "  ", "/etc/passwd", "../up.md", "a/../../b.md", "C:\\x.md"] {
            let err = normalize_document_path(bad).expect_err("path must be rejected");
            assert!(matches!(err, StoreError::InvalidPath(_)), "{bad}");
        }
    }

    #[test]
    fn extension_is_taken_from_file_name() {
        assert_eq!(document_extension("notes/today.md"), Some("md"));
        assert_eq!(document_extension("notes.d/today"), None);
        assert_eq!(document_extension(".hidden"), None);
        assert_eq!(document_extension("x.canvas"), Some("canvas"));
    }
}
