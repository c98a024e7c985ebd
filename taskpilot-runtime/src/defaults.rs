use std::path::PathBuf;

pub const CONFIG_FILENAME: &str = "config.json";
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Per-user config directory, falling back to the working directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("taskpilot"))
        .unwrap_or_else(|| PathBuf::from(".taskpilot"))
}

pub fn config_path(dir: &std::path::Path) -> PathBuf {
    dir.join(CONFIG_FILENAME)
}

pub fn settings_path(dir: &std::path::Path) -> PathBuf {
    dir.join(SETTINGS_FILENAME)
}
