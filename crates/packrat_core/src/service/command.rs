//! User-invocable sweep command.
//!
//! # Responsibility
//! - Describe the single host command and when it is available.
//! - Run the sweep on the active note and turn every outcome into a
//!   user-visible message.
//!
//! # Invariants
//! - `run_command` never returns an error; failures become `ok = false`.
//! - The command is only available for notes with extension `md`.

use crate::service::sweep_service::{SweepError, SweepReport, SweepService};
use crate::store::{document_extension, DocumentStore};
use log::{error, warn};

/// Stable command identifier registered with the host.
pub const COMMAND_ID: &str = "tasks-run-packrat";
/// Command palette display name.
pub const COMMAND_NAME: &str =
    "Tasks - process completed instances of recurring tasks within active note";
/// Only notes with this extension can be swept.
pub const SUPPORTED_NOTE_EXTENSION: &str = "md";

/// Result envelope of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub ok: bool,
    /// Summary on success, error description on failure.
    pub message: String,
    pub report: Option<SweepReport>,
}

impl CommandOutcome {
    fn success(report: SweepReport) -> Self {
        Self {
            ok: true,
            message: report.summary(),
            report: Some(report),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            report: None,
        }
    }
}

/// Returns whether the command can run for the given active note.
pub fn is_command_available(active_note: Option<&str>) -> bool {
    active_note
        .and_then(document_extension)
        .is_some_and(|extension| extension == SUPPORTED_NOTE_EXTENSION)
}

/// Runs the sweep command against the active note.
pub fn run_command<S: DocumentStore>(
    service: &SweepService<S>,
    active_note: Option<&str>,
) -> CommandOutcome {
    let Some(active_note) = active_note.filter(|note| is_command_available(Some(*note))) else {
        warn!(
            "event=command_run module=command status=skip command={} reason=no_markdown_note",
            COMMAND_ID
        );
        return CommandOutcome::failure("Packrat only works on an open markdown (.md) note");
    };

    match service.sweep(active_note) {
        Ok(report) => CommandOutcome::success(report),
        Err(err @ SweepError::ArchiveNotADocument(_)) => {
            error!(
                "event=command_run module=command status=error command={} error_code={}",
                COMMAND_ID,
                err.code()
            );
            CommandOutcome::failure(format!("Packrat configuration error: {err}"))
        }
        Err(err) => {
            error!(
                "event=command_run module=command status=error command={} error_code={}",
                COMMAND_ID,
                err.code()
            );
            CommandOutcome::failure(format!("Packrat failed: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_command_available, run_command};
    use crate::config::settings::PackratSettings;
    use crate::service::sweep_service::SweepService;
    use crate::store::MemoryDocumentStore;

    #[test]
    fn availability_requires_markdown_note() {
        assert!(is_command_available(Some("daily/today.md")));
        assert!(!is_command_available(Some("board.canvas")));
        assert!(!is_command_available(Some("today.MD")));
        assert!(!is_command_available(Some("README")));
        assert!(!is_command_available(None));
    }

    #[test]
    fn unavailable_command_reports_without_touching_store() {
        let store = MemoryDocumentStore::new();
        store.insert("board.canvas", "- [x] a \u{1F501} %%done_del%%").expect("insert");
        let service = SweepService::new(&store, PackratSettings::default());

        let outcome = run_command(&service, Some("board.canvas"));
        assert!(!outcome.ok);
        assert!(outcome.report.is_none());
        assert!(store.write_log().is_empty());
    }

    #[test]
    fn missing_note_becomes_failure_message() {
        let store = MemoryDocumentStore::new();
        let service = SweepService::new(&store, PackratSettings::default());

        let outcome = run_command(&service, Some("gone.md"));
        assert!(!outcome.ok);
        assert!(outcome.message.contains("gone.md"));
    }
}
