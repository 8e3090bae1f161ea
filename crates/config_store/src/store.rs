use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ConfigStoreError;
use crate::paths::default_config_path;
use crate::schema::SecretaryConfig;

const DIR_MODE: u32 = 0o700;
const FILE_MODE: u32 = 0o600;

/// Reads and writes the credentials file at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location, honouring the path override variable.
    pub fn locate() -> Result<Self, ConfigStoreError> {
        default_config_path().map(Self::at)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads and normalizes the config. Validation is left to the caller.
    pub fn load(&self) -> Result<SecretaryConfig, ConfigStoreError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|source| ConfigStoreError::io("reading config", &self.path, source))?;
        let config: SecretaryConfig = serde_json::from_str(&raw)
            .map_err(|source| ConfigStoreError::parse(&self.path, source))?;
        Ok(config.normalized())
    }

    /// Writes the normalized config as pretty JSON with owner-only permissions.
    pub fn save(&self, config: &SecretaryConfig) -> Result<(), ConfigStoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            create_private_dir(parent)?;
        }

        let config = config.clone().normalized();
        let mut body = serde_json::to_string_pretty(&config)
            .map_err(|source| ConfigStoreError::serialize(&self.path, source))?;
        body.push('\n');

        let mut file = open_private_file(&self.path)
            .map_err(|source| ConfigStoreError::io("opening config for write", &self.path, source))?;
        file.write_all(body.as_bytes())
            .map_err(|source| ConfigStoreError::io("writing config", &self.path, source))?;
        restrict_file_permissions(&self.path)
    }
}

/// Masks all but the last four characters; short secrets are fully hidden.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let visible: String = secret.chars().skip(count - 4).collect();
    format!("{}{visible}", "*".repeat(count - 4))
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> Result<(), ConfigStoreError> {
    use std::os::unix::fs::DirBuilderExt;

    if dir.is_dir() {
        return Ok(());
    }
    fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)
        .map_err(|source| ConfigStoreError::io("creating config directory", dir, source))
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> Result<(), ConfigStoreError> {
    let _ = DIR_MODE;
    fs::create_dir_all(dir)
        .map_err(|source| ConfigStoreError::io("creating config directory", dir, source))
}

#[cfg(unix)]
fn open_private_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(FILE_MODE)
        .open(path)
}

#[cfg(not(unix))]
fn open_private_file(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

// An older file keeps its mode across truncation, so tighten it explicitly.
#[cfg(unix)]
fn restrict_file_permissions(path: &Path) -> Result<(), ConfigStoreError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(FILE_MODE))
        .map_err(|source| ConfigStoreError::io("restricting config permissions", path, source))
}

#[cfg(not(unix))]
fn restrict_file_permissions(_path: &Path) -> Result<(), ConfigStoreError> {
    let _ = FILE_MODE;
    Ok(())
}
