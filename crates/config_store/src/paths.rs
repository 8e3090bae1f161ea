use std::path::{Path, PathBuf};

use crate::error::ConfigStoreError;

pub const CONFIG_DIR_NAME: &str = ".secretary";
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Overrides the default config location when set to a non-empty path.
pub const CONFIG_PATH_ENV_VAR: &str = "SECRETARY_CONFIG_PATH";

#[must_use]
pub fn config_path_under(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// `$SECRETARY_CONFIG_PATH`, else `$HOME/.secretary/config.json`.
pub fn default_config_path() -> Result<PathBuf, ConfigStoreError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV_VAR).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    dirs::home_dir()
        .map(|home| config_path_under(&home))
        .ok_or(ConfigStoreError::NoHomeDir(CONFIG_PATH_ENV_VAR))
}
