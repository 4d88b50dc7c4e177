//! Packrat settings model and JSON persistence.
//!
//! # Responsibility
//! - Define the four user-configurable sweep settings and their defaults.
//! - Load settings from disk merged over defaults, and save them back.
//!
//! # Invariants
//! - Missing keys in a persisted file fall back to defaults.
//! - Unknown keys in a persisted file are ignored.
//! - A missing settings file is not an error; it yields defaults.

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default trigger for deleting a completed recurring task.
pub const DEFAULT_DELETION_TRIGGER: &str = "%%done_del%%";
/// Default trigger for moving a completed recurring task to the note end.
pub const DEFAULT_BOTTOM_TRIGGER: &str = "%%done_end%%";
/// Default trigger for archiving a completed recurring task.
pub const DEFAULT_ARCHIVE_TRIGGER: &str = "%%done_log%%";
/// Default vault-relative archive note.
pub const DEFAULT_ARCHIVE_FILEPATH: &str = "archive.md";
/// Default vault-relative location of the persisted settings file.
pub const DEFAULT_SETTINGS_RELATIVE_PATH: &str = ".packrat/data.json";

/// Settings key for [`PackratSettings::deletion_trigger`].
pub const KEY_DELETION_TRIGGER: &str = "deletion_trigger";
/// Settings key for [`PackratSettings::bottom_trigger`].
pub const KEY_BOTTOM_TRIGGER: &str = "bottom_trigger";
/// Settings key for [`PackratSettings::archive_trigger`].
pub const KEY_ARCHIVE_TRIGGER: &str = "archive_trigger";
/// Settings key for [`PackratSettings::archive_filepath`].
pub const KEY_ARCHIVE_FILEPATH: &str = "archive_filepath";

const SETTINGS_KEYS: &[&str] = &[
    KEY_DELETION_TRIGGER,
    KEY_BOTTOM_TRIGGER,
    KEY_ARCHIVE_TRIGGER,
    KEY_ARCHIVE_FILEPATH,
];

/// Returns all editable settings keys in display order.
pub fn settings_keys() -> &'static [&'static str] {
    SETTINGS_KEYS
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Settings load/save/edit errors.
#[derive(Debug)]
pub enum SettingsError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Serialize(serde_json::Error),
    UnknownKey(String),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "settings file `{}` i/o failed: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "settings file `{}` is malformed: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize settings: {err}"),
            Self::UnknownKey(key) => write!(
                f,
                "unknown settings key `{key}`; expected one of {}",
                SETTINGS_KEYS.join("|")
            ),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::UnknownKey(_) => None,
        }
    }
}

/// Resolved sweep configuration passed to the sweeper at call time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackratSettings {
    /// Marks a completed recurring task for deletion.
    pub deletion_trigger: String,
    /// Marks a completed recurring task for moving to the end of the note.
    pub bottom_trigger: String,
    /// Marks a completed recurring task for archiving.
    pub archive_trigger: String,
    /// Vault-relative path of the archive note.
    pub archive_filepath: String,
}

impl Default for PackratSettings {
    fn default() -> Self {
        Self {
            deletion_trigger: DEFAULT_DELETION_TRIGGER.to_string(),
            bottom_trigger: DEFAULT_BOTTOM_TRIGGER.to_string(),
            archive_trigger: DEFAULT_ARCHIVE_TRIGGER.to_string(),
            archive_filepath: DEFAULT_ARCHIVE_FILEPATH.to_string(),
        }
    }
}

impl PackratSettings {
    /// Returns the current value of one settings key.
    pub fn get_field(&self, key: &str) -> SettingsResult<&str> {
        match key.trim() {
            KEY_DELETION_TRIGGER => Ok(&self.deletion_trigger),
            KEY_BOTTOM_TRIGGER => Ok(&self.bottom_trigger),
            KEY_ARCHIVE_TRIGGER => Ok(&self.archive_trigger),
            KEY_ARCHIVE_FILEPATH => Ok(&self.archive_filepath),
            other => Err(SettingsError::UnknownKey(other.to_string())),
        }
    }

    /// Replaces one settings value. The value is stored verbatim.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> SettingsResult<()> {
        let slot = match key.trim() {
            KEY_DELETION_TRIGGER => &mut self.deletion_trigger,
            KEY_BOTTOM_TRIGGER => &mut self.bottom_trigger,
            KEY_ARCHIVE_TRIGGER => &mut self.archive_trigger,
            KEY_ARCHIVE_FILEPATH => &mut self.archive_filepath,
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        };
        *slot = value.into();
        info!(
            "event=settings_set module=config status=ok key={}",
            key.trim()
        );
        Ok(())
    }
}

/// Returns the default settings file location inside `vault_root`.
pub fn default_settings_path(vault_root: impl AsRef<Path>) -> PathBuf {
    vault_root.as_ref().join(DEFAULT_SETTINGS_RELATIVE_PATH)
}

/// Loads settings from `path`, merging persisted values over defaults.
///
/// # Errors
/// - Returns `Io` when the file exists but cannot be read.
/// - Returns `Parse` when the file is not a JSON object of string values.
pub fn load_settings(path: impl AsRef<Path>) -> SettingsResult<PackratSettings> {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                "event=settings_load module=config status=ok source=defaults path={}",
                path.display()
            );
            return Ok(PackratSettings::default());
        }
        Err(source) => {
            error!(
                "event=settings_load module=config status=error error_code=settings_read_failed path={} error={}",
                path.display(),
                source
            );
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let settings = serde_json::from_str::<PackratSettings>(&raw).map_err(|source| {
        error!(
            "event=settings_load module=config status=error error_code=settings_parse_failed path={} error={}",
            path.display(),
            source
        );
        SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!(
        "event=settings_load module=config status=ok source=file path={}",
        path.display()
    );
    Ok(settings)
}

/// Saves settings as pretty JSON, creating parent directories when needed.
pub fn save_settings(path: impl AsRef<Path>, settings: &PackratSettings) -> SettingsResult<()> {
    let path = path.as_ref();
    let io_error = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let body = serde_json::to_string_pretty(settings).map_err(SettingsError::Serialize)?;
    std::fs::write(path, body).map_err(io_error)?;

    info!(
        "event=settings_save module=config status=ok path={}",
        path.display()
    );
    Ok(())
}
