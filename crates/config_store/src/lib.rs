//! Persistent credentials for the tracker and the assistant backend.

mod error;
mod paths;
mod schema;
mod store;

pub use error::ConfigStoreError;
pub use paths::{default_config_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_PATH_ENV_VAR};
pub use schema::{SecretaryConfig, DEFAULT_GEMINI_MODEL};
pub use store::{mask_secret, ConfigStore};
