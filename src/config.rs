use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AgendaError;
use crate::models::DEFAULT_DURATION_MINUTES;

/// Application-level constants
pub const APP_NAME: &str = "Fixit Agenda";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DATA_DIR_NAME: &str = "FixitAgenda";
const DEFAULT_DATABASE_FILE: &str = "agenda.db";
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Application data directory: the platform data dir, else the home
/// directory, else the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

/// Default location of the agenda database.
pub fn database_path() -> PathBuf {
    app_data_dir().join(DEFAULT_DATABASE_FILE)
}

/// Get the default log filter
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "fixit_agenda=debug,info"
    } else {
        "fixit_agenda=info,warn"
    }
}

/// Tunables for the async service. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgendaSettings {
    /// Relative paths resolve against `app_data_dir()`.
    pub database_file: PathBuf,
    /// Lifecycle events buffered per subscriber before it starts lagging.
    pub event_capacity: usize,
    pub default_duration_minutes: u32,
}

impl Default for AgendaSettings {
    fn default() -> Self {
        Self {
            database_file: PathBuf::from(DEFAULT_DATABASE_FILE),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }
}

impl AgendaSettings {
    pub fn database_path(&self) -> PathBuf {
        if self.database_file.is_absolute() {
            self.database_file.clone()
        } else {
            app_data_dir().join(&self.database_file)
        }
    }
}

/// Load settings from a JSON file. A missing file yields the defaults.
pub fn load_settings(path: &Path) -> Result<AgendaSettings, AgendaError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No settings file, using defaults");
        return Ok(AgendaSettings::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| AgendaError::InvalidInput(format!("cannot read {}: {e}", path.display())))?;
    let settings: AgendaSettings = serde_json::from_str(&raw)
        .map_err(|e| AgendaError::InvalidInput(format!("malformed settings {}: {e}", path.display())))?;

    if settings.event_capacity == 0 {
        return Err(AgendaError::InvalidInput("event_capacity must be positive".into()));
    }
    tracing::info!(path = %path.display(), "Settings loaded");
    Ok(settings)
}
