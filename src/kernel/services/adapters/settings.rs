use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::paths::get_cache_dir;
use crate::kernel::services::ports::settings::Settings;

const SETTINGS_DIR: &str = ".whisperline";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot determine settings directory")]
    NoSettingsDir,
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn get_settings_path() -> Option<PathBuf> {
    get_cache_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

/// Creates the settings file with defaults if it does not exist yet.
pub fn ensure_settings_file() -> Result<PathBuf, SettingsError> {
    let path = get_settings_path().ok_or(SettingsError::NoSettingsDir)?;
    ensure_settings_file_at(&path)?;
    Ok(path)
}

pub fn ensure_settings_file_at(path: &Path) -> Result<(), SettingsError> {
    let io_err = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    if !path.exists() {
        let content =
            serde_json::to_string_pretty(&Settings::default()).unwrap_or_else(|_| "{}".to_string());
        std::fs::write(path, content).map_err(io_err)?;
    }
    Ok(())
}

/// Settings from the default location. A missing or unreadable file yields
/// the defaults; the failure is logged.
pub fn load_settings() -> Settings {
    let Some(path) = get_settings_path() else {
        return Settings::default();
    };
    if !path.exists() {
        return Settings::default();
    }
    match load_settings_from(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to default settings");
            Settings::default()
        }
    }
}

pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    let data = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
