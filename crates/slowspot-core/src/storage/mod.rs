mod preferences;

pub use preferences::{
    MemoryPreferenceStore, PreferenceStore, Preferences, Theme, TomlPreferenceStore,
};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the SlowSpot configuration directory, creating it if needed.
///
/// `SLOWSPOT_CONFIG_DIR` overrides the location outright. Otherwise this is
/// `~/.config/slowspot/`, or `~/.config/slowspot-dev/` when
/// `SLOWSPOT_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("SLOWSPOT_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SLOWSPOT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("slowspot-dev")
            } else {
                base_dir.join("slowspot")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirectoryUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
