//! In-memory document store for tests and embedding hosts.

use super::{normalize_document_path, DocumentStore, EntryKind, StoreError, StoreResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    documents: BTreeMap<String, String>,
    folders: BTreeSet<String>,
    failing_reads: BTreeSet<String>,
    failing_writes: BTreeSet<String>,
    write_log: Vec<String>,
}

/// Document store holding all documents in memory.
///
/// Supports registering folders and injecting read/write failures so error
/// paths can be exercised without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    state: Mutex<MemoryState>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a document without going through `create`.
    pub fn insert(&self, path: &str, text: impl Into<String>) -> StoreResult<()> {
        let key = normalize_document_path(path)?;
        self.lock().documents.insert(key, text.into());
        Ok(())
    }

    /// Registers a folder entry at `path`.
    pub fn add_folder(&self, path: &str) -> StoreResult<()> {
        let key = normalize_document_path(path)?;
        self.lock().folders.insert(key);
        Ok(())
    }

    /// Makes every subsequent read of `path` fail with an i/o error.
    pub fn fail_reads_for(&self, path: &str) -> StoreResult<()> {
        let key = normalize_document_path(path)?;
        self.lock().failing_reads.insert(key);
        Ok(())
    }

    /// Makes every subsequent write of `path` fail with an i/o error.
    pub fn fail_writes_for(&self, path: &str) -> StoreResult<()> {
        let key = normalize_document_path(path)?;
        self.lock().failing_writes.insert(key);
        Ok(())
    }

    /// Returns the current text of a document, if present.
    pub fn get(&self, path: &str) -> Option<String> {
        let key = normalize_document_path(path).ok()?;
        self.lock().documents.get(&key).cloned()
    }

    /// Returns normalized paths of successful writes and creates, in order.
    pub fn write_log(&self) -> Vec<String> {
        self.lock().write_log.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // Poisoning is ignored; every mutation leaves the maps consistent.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn injected_failure(path: &str, operation: &str) -> StoreError {
    StoreError::Io {
        path: path.to_string(),
        source: std::io::Error::other(format!("injected {operation} failure")),
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self, path: &str) -> StoreResult<String> {
        let key = normalize_document_path(path)?;
        let state = self.lock();
        if state.failing_reads.contains(&key) {
            return Err(injected_failure(&key, "read"));
        }
        if state.folders.contains(&key) {
            return Err(StoreError::NotADocument(key));
        }
        state
            .documents
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound(key))
    }

    fn write(&self, path: &str, text: &str) -> StoreResult<()> {
        let key = normalize_document_path(path)?;
        let mut state = self.lock();
        if state.failing_writes.contains(&key) {
            return Err(injected_failure(&key, "write"));
        }
        if state.folders.contains(&key) {
            return Err(StoreError::NotADocument(key));
        }
        state.documents.insert(key.clone(), text.to_string());
        state.write_log.push(key);
        Ok(())
    }

    fn exists(&self, path: &str) -> StoreResult<Option<EntryKind>> {
        let key = normalize_document_path(path)?;
        let state = self.lock();
        if state.folders.contains(&key) {
            Ok(Some(EntryKind::Folder))
        } else if state.documents.contains_key(&key) {
            Ok(Some(EntryKind::Document))
        } else {
            Ok(None)
        }
    }

    fn create(&self, path: &str, initial_text: &str) -> StoreResult<()> {
        let key = normalize_document_path(path)?;
        let mut state = self.lock();
        if state.documents.contains_key(&key) || state.folders.contains(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        if state.failing_writes.contains(&key) {
            return Err(injected_failure(&key, "create"));
        }
        state.documents.insert(key.clone(), initial_text.to_string());
        state.write_log.push(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryDocumentStore;
    use crate::store::{DocumentStore, EntryKind, StoreError};

    #[test]
    fn tracks_documents_folders_and_write_order() {
        let store = MemoryDocumentStore::new();
        store.insert("note.md", "body").expect("insert");
        store.add_folder("archive").expect("folder");

        assert_eq!(store.exists("note.md").expect("exists"), Some(EntryKind::Document));
        assert_eq!(store.exists("archive").expect("exists"), Some(EntryKind::Folder));
        assert_eq!(store.exists("other.md").expect("exists"), None);

        store.create("log.md", "").expect("create");
        store.write("note.md", "changed").expect("write");
        assert_eq!(store.write_log(), vec!["log.md", "note.md"]);
        assert_eq!(store.get("note.md").as_deref(), Some("changed"));
    }

    #[test]
    fn injected_failures_surface_as_io_errors() {
        let store = MemoryDocumentStore::new();
        store.insert("note.md", "body").expect("insert");
        store.fail_reads_for("note.md").expect("inject");

        let err = store.read("note.md").expect_err("read must fail");
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains("injected read failure"));
    }
}
