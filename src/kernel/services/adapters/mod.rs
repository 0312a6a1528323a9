//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod paths;
pub mod runtime;
pub mod settings;

pub use paths::{ensure_log_dir, get_cache_dir, get_log_dir};
pub use runtime::AsyncRuntime;
pub use settings::{
    ensure_settings_file, ensure_settings_file_at, get_settings_path, load_settings,
    load_settings_from, SettingsError,
};
