//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the sweep command and settings editing to a host UI via FRB.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Vault paths are absolute host paths; note paths are vault-relative.

use packrat_core::{
    core_version as core_version_inner, default_settings_path,
    init_logging as init_logging_inner, is_command_available, load_settings, run_command,
    save_settings, FsDocumentStore, PackratSettings, SweepService, COMMAND_ID, COMMAND_NAME,
};
use std::path::Path;

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Host command registration metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackratCommandInfo {
    pub id: String,
    pub name: String,
}

/// Returns the command id and palette name the host should register.
#[flutter_rust_bridge::frb(sync)]
pub fn packrat_command_info() -> PackratCommandInfo {
    PackratCommandInfo {
        id: COMMAND_ID.to_string(),
        name: COMMAND_NAME.to_string(),
    }
}

/// Returns whether the sweep command should be enabled for `active_note`.
///
/// # FFI contract
/// - Sync call, pure string check.
/// - `None` means no note is active.
#[flutter_rust_bridge::frb(sync)]
pub fn packrat_command_available(active_note: Option<String>) -> bool {
    is_command_available(active_note.as_deref())
}

/// Settings shape mirrored to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackratSettingsDto {
    pub deletion_trigger: String,
    pub bottom_trigger: String,
    pub archive_trigger: String,
    pub archive_filepath: String,
}

impl From<PackratSettings> for PackratSettingsDto {
    fn from(value: PackratSettings) -> Self {
        Self {
            deletion_trigger: value.deletion_trigger,
            bottom_trigger: value.bottom_trigger,
            archive_trigger: value.archive_trigger,
            archive_filepath: value.archive_filepath,
        }
    }
}

impl From<PackratSettingsDto> for PackratSettings {
    fn from(value: PackratSettingsDto) -> Self {
        Self {
            deletion_trigger: value.deletion_trigger,
            bottom_trigger: value.bottom_trigger,
            archive_trigger: value.archive_trigger,
            archive_filepath: value.archive_filepath,
        }
    }
}

/// Settings load response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackratSettingsResponse {
    pub ok: bool,
    /// Effective settings; defaults when loading failed.
    pub settings: PackratSettingsDto,
    pub message: String,
}

/// Loads vault settings merged over defaults.
///
/// # FFI contract
/// - Sync call, small file read.
/// - Never panics; on failure returns defaults with `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn load_packrat_settings(vault_root: String) -> PackratSettingsResponse {
    let vault_root = match absolute_vault_root(&vault_root) {
        Ok(vault_root) => vault_root,
        Err(err) => {
            return PackratSettingsResponse {
                ok: false,
                settings: PackratSettings::default().into(),
                message: format!("load_packrat_settings failed: {err}"),
            }
        }
    };
    match load_settings(default_settings_path(vault_root)) {
        Ok(settings) => PackratSettingsResponse {
            ok: true,
            settings: settings.into(),
            message: String::new(),
        },
        Err(err) => PackratSettingsResponse {
            ok: false,
            settings: PackratSettings::default().into(),
            message: format!("load_packrat_settings failed: {err}"),
        },
    }
}

/// Saves vault settings.
///
/// # FFI contract
/// - Sync call, small file write.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn save_packrat_settings(vault_root: String, settings: PackratSettingsDto) -> String {
    let vault_root = match absolute_vault_root(&vault_root) {
        Ok(vault_root) => vault_root,
        Err(err) => return format!("save_packrat_settings failed: {err}"),
    };
    let settings = PackratSettings::from(settings);
    match save_settings(default_settings_path(vault_root), &settings) {
        Ok(()) => String::new(),
        Err(err) => format!("save_packrat_settings failed: {err}"),
    }
}

/// Sweep command response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackratActionResponse {
    pub ok: bool,
    /// Summary text on success; user-facing error otherwise.
    pub message: String,
    pub deleted: u32,
    pub moved: u32,
    pub archived: u32,
}

/// Runs the sweep command on `active_note` inside the vault at `vault_root`.
///
/// # FFI contract
/// - Sync call, file-backed execution.
/// - Never panics.
/// - Counters are zero when `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn run_packrat(vault_root: String, active_note: Option<String>) -> PackratActionResponse {
    let vault_root = match absolute_vault_root(&vault_root) {
        Ok(vault_root) => vault_root,
        Err(err) => return failure(format!("run_packrat failed: {err}")),
    };

    let settings = match load_settings(default_settings_path(vault_root)) {
        Ok(settings) => settings,
        Err(err) => return failure(format!("run_packrat failed: {err}")),
    };
    let service = SweepService::new(FsDocumentStore::new(vault_root), settings);
    let outcome = run_command(&service, active_note.as_deref());
    let counts = outcome.report.map(|report| report.counts).unwrap_or_default();

    PackratActionResponse {
        ok: outcome.ok,
        message: outcome.message,
        deleted: saturating_u32(counts.deleted),
        moved: saturating_u32(counts.moved),
        archived: saturating_u32(counts.archived),
    }
}

fn absolute_vault_root(vault_root: &str) -> Result<&str, String> {
    let vault_root = vault_root.trim();
    if vault_root.is_empty() || !Path::new(vault_root).is_absolute() {
        return Err(format!(
            "vault_root must be an absolute path, got `{vault_root}`"
        ));
    }
    Ok(vault_root)
}

fn failure(message: String) -> PackratActionResponse {
    PackratActionResponse {
        ok: false,
        message,
        deleted: 0,
        moved: 0,
        archived: 0,
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, load_packrat_settings, packrat_command_available,
        packrat_command_info, run_packrat, save_packrat_settings,
    };
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn command_info_and_availability() {
        assert_eq!(packrat_command_info().id, "tasks-run-packrat");
        assert!(packrat_command_available(Some("today.md".to_string())));
        assert!(!packrat_command_available(Some("board.canvas".to_string())));
        assert!(!packrat_command_available(None));
    }

    #[test]
    fn run_packrat_rejects_relative_vault() {
        let response = run_packrat("vault".to_string(), Some("a.md".to_string()));
        assert!(!response.ok);
        assert!(response.message.contains("absolute"));
    }

    #[test]
    fn settings_calls_reject_relative_vault() {
        let response = load_packrat_settings(String::new());
        assert!(!response.ok);
        assert!(response.message.contains("absolute"));

        let settings = load_packrat_settings("vault".to_string()).settings;
        let error = save_packrat_settings("vault".to_string(), settings);
        assert!(error.contains("absolute"));
        assert!(!std::path::Path::new("vault/.packrat").exists());
    }

    #[test]
    fn concurrent_run_packrat_calls_archive_a_task_once() {
        let vault = unique_vault("concurrent");
        std::fs::create_dir_all(&vault).expect("create vault");
        let vault_str = vault.to_str().expect("utf-8 path").to_string();
        std::fs::write(vault.join("today.md"), "- [x] b \u{1F501} %%done_log%%")
            .expect("write note");

        let responses: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let vault_str = vault_str.clone();
                    scope.spawn(move || run_packrat(vault_str, Some("today.md".to_string())))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("sweep thread"))
                .collect()
        });

        assert!(responses.iter().all(|response| response.ok));
        let archived: u32 = responses.iter().map(|response| response.archived).sum();
        assert_eq!(archived, 1);
        assert_eq!(
            std::fs::read_to_string(vault.join("archive.md")).expect("read archive"),
            "\n- [x] b \u{1F501} %%done_log%%"
        );

        let _ = std::fs::remove_dir_all(&vault);
    }

    #[test]
    fn run_packrat_sweeps_with_saved_settings() {
        let vault = unique_vault("sweep");
        std::fs::create_dir_all(&vault).expect("create vault");
        let vault_str = vault.to_str().expect("utf-8 path").to_string();

        let mut settings = load_packrat_settings(vault_str.clone()).settings;
        settings.archive_filepath = "log.md".to_string();
        assert_eq!(save_packrat_settings(vault_str.clone(), settings), "");

        std::fs::write(
            vault.join("today.md"),
            "- [x] a \u{1F501} %%done_log%%\n- [x] b \u{1F501} %%done_del%%\nkeep",
        )
        .expect("write note");

        let response = run_packrat(vault_str, Some("today.md".to_string()));
        assert!(response.ok, "{}", response.message);
        assert_eq!((response.deleted, response.moved, response.archived), (1, 0, 1));
        assert_eq!(
            std::fs::read_to_string(vault.join("today.md")).expect("read note"),
            "keep"
        );
        assert!(vault.join("log.md").is_file());

        let _ = std::fs::remove_dir_all(&vault);
    }

    fn unique_vault(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "packrat-ffi-{prefix}-{}-{nanos}",
            std::process::id()
        ))
    }
}
