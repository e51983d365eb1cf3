// Configuration lives in two INI files next to each other:
//   search_engines.ini  - search engine registry (name + URL template)
//   config.ini          - viewer settings and key bindings
// Both are created with defaults on first run. Malformed entries fall back
// per-key with a warning; config can never abort startup.

pub mod engines;
pub mod settings;

use std::path::PathBuf;

/// Directory holding both INI files (~/.config/sheetseek on Linux).
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sheetseek")
}

pub fn engines_path() -> PathBuf {
    config_dir().join("search_engines.ini")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("config.ini")
}
