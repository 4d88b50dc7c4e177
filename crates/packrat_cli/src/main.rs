//! Packrat command-line host.
//!
//! # Responsibility
//! - Run the sweep command against one note of a vault directory.
//! - Show and edit the persisted sweep settings.
//! - Own terminal output and exit codes; core stays I/O-agnostic.

use clap::{Args, Parser, Subcommand};
use packrat_core::{
    default_settings_path, init_logging, load_settings, run_command, save_settings,
    FsDocumentStore, LogLevel, SweepService,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "packrat", version, about = "Sweep completed recurring tasks out of markdown notes")]
struct Cli {
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Process completed recurring tasks within one note.
    Sweep {
        /// Vault-relative path of the note to sweep.
        note: String,
        #[command(flatten)]
        location: VaultLocation,
    },
    /// Show or edit sweep settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
        #[command(flatten)]
        location: VaultLocation,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    /// Print effective settings as JSON.
    Show,
    /// Update one settings key and save.
    Set { key: String, value: String },
}

#[derive(Debug, Args)]
struct VaultLocation {
    /// Vault root directory.
    #[arg(long, default_value = ".")]
    vault: PathBuf,

    /// Settings file; defaults to `<vault>/.packrat/data.json`.
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl VaultLocation {
    fn settings_path(&self) -> PathBuf {
        self.settings
            .clone()
            .unwrap_or_else(|| default_settings_path(&self.vault))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| LogLevel::build_default().as_str().to_string());
        if let Err(err) = init_logging(&level, &log_dir.to_string_lossy()) {
            eprintln!("packrat: {err}");
            return ExitCode::FAILURE;
        }
    }

    let result = match cli.command {
        Command::Sweep { note, location } => sweep(&note, &location),
        Command::Settings { action, location } => settings(action, &location),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("packrat: {message}");
            ExitCode::FAILURE
        }
    }
}

fn sweep(note: &str, location: &VaultLocation) -> Result<(), String> {
    let settings = load_settings(location.settings_path()).map_err(|err| err.to_string())?;
    let service = SweepService::new(FsDocumentStore::new(&location.vault), settings);
    let outcome = run_command(&service, Some(note));
    if outcome.ok {
        print!("{}", outcome.message);
        Ok(())
    } else {
        Err(outcome.message)
    }
}

fn settings(action: SettingsAction, location: &VaultLocation) -> Result<(), String> {
    let path = location.settings_path();
    let mut settings = load_settings(&path).map_err(|err| err.to_string())?;

    match action {
        SettingsAction::Show => {
            let body = serde_json::to_string_pretty(&settings).map_err(|err| err.to_string())?;
            println!("{body}");
        }
        SettingsAction::Set { key, value } => {
            settings
                .set_field(&key, value)
                .map_err(|err| err.to_string())?;
            save_settings(&path, &settings).map_err(|err| err.to_string())?;
            println!("{} = {}", key.trim(), settings.get_field(&key).unwrap_or_default());
            println!("saved to {}", path.display());
        }
    }
    Ok(())
}
