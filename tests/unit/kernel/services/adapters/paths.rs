use super::*;

#[test]
fn log_dir_is_namespaced() {
    let Some(dir) = get_log_dir() else {
        return;
    };
    let dir = dir.to_string_lossy().to_string();
    assert!(dir.contains(APP_NAME));
    assert!(dir.ends_with(LOG_DIR));
}

#[test]
fn cache_dir_resolves_when_home_is_set() {
    if std::env::var_os("HOME").is_none() && std::env::var_os("LOCALAPPDATA").is_none() {
        return;
    }
    assert!(get_cache_dir().is_some());
}
