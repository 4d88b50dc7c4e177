//! Core domain logic for Packrat.
//! Sweeps completed recurring tasks out of markdown notes: delete them, move
//! them to the end of the note, or append them to an archive note.

pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::settings::{
    default_settings_path, load_settings, save_settings, settings_keys, PackratSettings,
    SettingsError, SettingsResult,
};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::sweep_plan::{plan_sweep, SweepCounts, SweepPlan};
pub use model::task_line::{classify_line, LineDisposition};
pub use service::command::{
    is_command_available, run_command, CommandOutcome, COMMAND_ID, COMMAND_NAME,
};
pub use service::sweep_service::{format_summary, SweepError, SweepReport, SweepService};
pub use store::{
    DocumentStore, EntryKind, FsDocumentStore, MemoryDocumentStore, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
