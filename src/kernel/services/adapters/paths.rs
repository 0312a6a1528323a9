//! Per-user directories.
//!
//! - data: `~/Library/Application Support/whisperline` (macOS),
//!   `$XDG_DATA_HOME/whisperline` or `~/.local/share/whisperline` (Linux),
//!   `%APPDATA%\whisperline` (Windows)
//! - cache: `~/Library/Caches`, `$XDG_CACHE_HOME` or `~/.cache`, `%LOCALAPPDATA%`

use std::path::PathBuf;

pub(crate) const APP_NAME: &str = "whisperline";
const LOG_DIR: &str = "logs";

fn get_app_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_NAME)
        })
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            Some(PathBuf::from(xdg).join(APP_NAME))
        } else {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".local/share").join(APP_NAME))
        }
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_NAME))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

pub fn get_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Caches"));
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
            return Some(PathBuf::from(xdg));
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".cache"));
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            return Some(PathBuf::from(local));
        }
        return std::env::var("APPDATA").ok().map(PathBuf::from);
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

pub fn get_log_dir() -> Option<PathBuf> {
    get_app_data_dir().map(|p| p.join(LOG_DIR))
}

pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    let dir = get_log_dir().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "Cannot determine log directory")
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/paths.rs"]
mod tests;
