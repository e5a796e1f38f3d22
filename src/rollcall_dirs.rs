//! Centralized application directory paths for rollcall.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! # Environment Overrides
//!
//! - `ROLLCALL_DATA_DIR` overrides [`data_dir`]
//! - `ROLLCALL_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory.
///
/// Holds the availabilities directory and optional log files.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("ROLLCALL_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("rollcall"))
        .unwrap_or_else(|| PathBuf::from("/tmp/rollcall-data"))
}

/// Application config directory (holds `config.toml`).
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("ROLLCALL_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("rollcall"))
        .unwrap_or_else(|| PathBuf::from("/tmp/rollcall-config"))
}

/// Default per-user availability files directory (`data_dir()/availabilities/`).
#[must_use]
pub fn availabilities_dir() -> PathBuf {
    data_dir().join("availabilities")
}

/// Default config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
