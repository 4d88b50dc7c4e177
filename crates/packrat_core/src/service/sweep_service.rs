//! Recurring-task sweep use-case service.
//!
//! # Responsibility
//! - Read the active note, plan the sweep and write the results back.
//! - Append archived lines to the configured archive note, creating it once.
//! - Serialize concurrent sweeps touching the same documents.
//!
//! # Invariants
//! - Write order is archive first, active note second.
//! - Any failure before the active write leaves the active note untouched.
//! - A non-document archive path aborts the whole sweep before any write.
//! - Document locks are process-wide, taken before the first read and held
//!   until the last write.

use crate::config::settings::PackratSettings;
use crate::model::sweep_plan::{plan_sweep, SweepCounts, SweepPlan};
use crate::store::{normalize_document_path, DocumentStore, EntryKind, StoreError};
use log::{error, info, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use uuid::Uuid;

/// Stable identifier for one sweep invocation, used to correlate log events.
pub type SweepRunId = Uuid;

/// Service error for sweep use-cases.
#[derive(Debug)]
pub enum SweepError {
    /// Document store failure (read, write, create or path validation).
    Store(StoreError),
    /// Configured archive path resolves to a folder or other non-document.
    ArchiveNotADocument(String),
}

impl Display for SweepError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::ArchiveNotADocument(path) => write!(
                f,
                "archive path `{path}` is not a note; check the archive file setting"
            ),
        }
    }
}

impl Error for SweepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::ArchiveNotADocument(_) => None,
        }
    }
}

impl From<StoreError> for SweepError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl SweepError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(StoreError::NotFound(_)) => "document_not_found",
            Self::Store(StoreError::NotADocument(_)) => "not_a_document",
            Self::Store(StoreError::AlreadyExists(_)) => "document_exists",
            Self::Store(StoreError::InvalidPath(_)) => "invalid_path",
            Self::Store(StoreError::Io { .. }) => "store_io_failed",
            Self::ArchiveNotADocument(_) => "archive_not_a_document",
        }
    }
}

/// Outcome of one successful sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub run_id: SweepRunId,
    /// Normalized path of the swept note.
    pub active_path: String,
    /// Normalized archive path, set only when lines were archived.
    pub archive_path: Option<String>,
    pub counts: SweepCounts,
}

impl SweepReport {
    /// User-facing summary of the three counters.
    pub fn summary(&self) -> String {
        format_summary(&self.counts)
    }
}

/// Formats the user-facing summary for a set of counters.
pub fn format_summary(counts: &SweepCounts) -> String {
    format!(
        "{} tasks deleted\n{} tasks moved to end of note\n{} tasks archived\n",
        counts.deleted, counts.moved, counts.archived
    )
}

/// Per-document lock registry.
///
/// Locks are always taken in sorted key order, so two sweeps touching the
/// same pair of documents cannot deadlock.
#[derive(Debug, Default)]
struct DocumentLocks {
    entries: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    /// Returns lock handles for `keys`, deduplicated and in sorted order.
    fn handles<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Vec<Arc<Mutex<()>>> {
        let mut sorted: Vec<&str> = keys.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut entries = lock_ignoring_poison(&self.entries);
        sorted
            .into_iter()
            .map(|key| {
                entries
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .clone()
            })
            .collect()
    }

    /// Drops registry entries for `keys` that no caller still holds.
    fn prune<'a>(&self, keys: impl IntoIterator<Item = &'a str>) {
        let mut entries = lock_ignoring_poison(&self.entries);
        for key in keys {
            if entries
                .get(key)
                .is_some_and(|handle| Arc::strong_count(handle) == 1)
            {
                entries.remove(key);
            }
        }
    }
}

/// Registry shared by every service in the process.
static DOCUMENT_LOCKS: Lazy<DocumentLocks> = Lazy::new(DocumentLocks::default);

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sweep service facade over a document store.
pub struct SweepService<S: DocumentStore> {
    store: S,
    settings: PackratSettings,
}

impl<S: DocumentStore> SweepService<S> {
    /// Creates a service using the provided store and resolved settings.
    pub fn new(store: S, settings: PackratSettings) -> Self {
        Self {
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &PackratSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sweeps completed recurring tasks out of the note at `active_path`.
    ///
    /// # Errors
    /// - `Store` when the active note cannot be read, or any write fails.
    /// - `ArchiveNotADocument` when archiving is needed and the archive path
    ///   is a folder.
    pub fn sweep(&self, active_path: &str) -> Result<SweepReport, SweepError> {
        let run_id = Uuid::new_v4();
        let started_at = Instant::now();
        info!(
            "event=sweep module=service status=start run_id={} path={}",
            run_id, active_path
        );

        match self.sweep_inner(run_id, active_path) {
            Ok(report) => {
                info!(
                    "event=sweep module=service status=ok run_id={} path={} deleted={} moved={} archived={} duration_ms={}",
                    run_id,
                    report.active_path,
                    report.counts.deleted,
                    report.counts.moved,
                    report.counts.archived,
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=sweep module=service status=error run_id={} path={} duration_ms={} error_code={} error={}",
                    run_id,
                    active_path,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn sweep_inner(&self, run_id: SweepRunId, active_path: &str) -> Result<SweepReport, SweepError> {
        let active_path = normalize_document_path(active_path)?;
        let archive_path = normalize_document_path(&self.settings.archive_filepath);
        let keys: Vec<String> = std::iter::once(active_path.as_str())
            .chain(archive_path.as_deref().ok())
            .map(|path| self.store.lock_key(path))
            .collect();

        let handles = DOCUMENT_LOCKS.handles(keys.iter().map(String::as_str));
        let result = {
            let _guards: Vec<MutexGuard<'_, ()>> =
                handles.iter().map(|handle| lock_ignoring_poison(handle.as_ref())).collect();
            self.sweep_locked(run_id, active_path, archive_path)
        };
        drop(handles);
        DOCUMENT_LOCKS.prune(keys.iter().map(String::as_str));
        result
    }

    fn sweep_locked(
        &self,
        run_id: SweepRunId,
        active_path: String,
        archive_path: Result<String, StoreError>,
    ) -> Result<SweepReport, SweepError> {
        let original = self.store.read(&active_path)?;
        let mut plan = plan_sweep(&original, &self.settings);

        let archive_path = if plan.has_archive_lines() {
            let archive_path = archive_path?;
            if archive_path == active_path {
                // Archive is the swept note: archived lines land at its end.
                warn!(
                    "event=archive_append module=service status=skip run_id={} reason=archive_is_active_note path={}",
                    run_id, archive_path
                );
                let archived = std::mem::take(&mut plan.archived);
                plan.appended.extend(archived);
            } else {
                self.append_to_archive(run_id, &archive_path, &plan)?;
            }
            Some(archive_path)
        } else {
            None
        };

        self.store.write(&active_path, &plan.active_text())?;

        Ok(SweepReport {
            run_id,
            active_path,
            archive_path,
            counts: plan.counts,
        })
    }

    fn append_to_archive(
        &self,
        run_id: SweepRunId,
        archive_path: &str,
        plan: &SweepPlan,
    ) -> Result<(), SweepError> {
        let existing = match self.store.exists(archive_path)? {
            Some(EntryKind::Document) => self.store.read(archive_path)?,
            Some(EntryKind::Folder) => {
                return Err(SweepError::ArchiveNotADocument(archive_path.to_string()));
            }
            None => {
                info!(
                    "event=archive_create module=service status=ok run_id={} path={}",
                    run_id, archive_path
                );
                self.store.create(archive_path, "")?;
                String::new()
            }
        };

        self.store
            .write(archive_path, &plan.merge_into_archive(&existing))?;
        info!(
            "event=archive_append module=service status=ok run_id={} path={} lines={}",
            run_id,
            archive_path,
            plan.archived.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{format_summary, DocumentLocks, SweepError};
    use crate::model::sweep_plan::SweepCounts;
    use crate::store::StoreError;

    #[test]
    fn summary_matches_user_facing_format() {
        let counts = SweepCounts {
            deleted: 2,
            moved: 1,
            archived: 0,
        };
        assert_eq!(
            format_summary(&counts),
            "2 tasks deleted\n1 tasks moved to end of note\n0 tasks archived\n"
        );
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            SweepError::ArchiveNotADocument("logs".to_string()).code(),
            "archive_not_a_document"
        );
        assert_eq!(
            SweepError::from(StoreError::NotFound("a.md".to_string())).code(),
            "document_not_found"
        );
    }

    #[test]
    fn lock_handles_are_sorted_deduplicated_and_pruned() {
        let locks = DocumentLocks::default();
        let handles = locks.handles(["b.md", "a.md", "b.md"]);
        assert_eq!(handles.len(), 2);
        assert_eq!(locks.entries.lock().expect("registry").len(), 2);

        locks.prune(["a.md", "b.md"]);
        assert_eq!(locks.entries.lock().expect("registry").len(), 2);

        drop(handles);
        locks.prune(["a.md", "b.md"]);
        assert!(locks.entries.lock().expect("registry").is_empty());
    }
}
