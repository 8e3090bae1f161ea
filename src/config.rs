//! Environment configuration.

use std::env;

use config_store::CONFIG_PATH_ENV_VAR;

use crate::providers::PROVIDER_ENV_VAR;

pub const LOG_ENV_VAR: &str = "SECRETARY_LOG";
pub const NO_COLOR_ENV_VAR: &str = "NO_COLOR";

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub provider: Option<String>,
    pub config_path: Option<String>,
    pub log_filter: Option<String>,
    pub no_color: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            provider: env_string_opt(PROVIDER_ENV_VAR),
            config_path: env_string_opt(CONFIG_PATH_ENV_VAR),
            log_filter: env_string_opt(LOG_ENV_VAR),
            no_color: env_present(NO_COLOR_ENV_VAR),
        }
    }

    /// Colors are on unless `NO_COLOR` is set to anything non-empty.
    #[must_use]
    pub fn color(&self) -> bool {
        !self.no_color
    }
}

fn env_present(key: &str) -> bool {
    env::var_os(key).is_some_and(|value| !value.is_empty())
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::EnvConfig;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn unset_environment_yields_defaults() {
        let _lock = env_lock();
        let _g1 = set_env_guard("SECRETARY_PROVIDER", None);
        let _g2 = set_env_guard("SECRETARY_CONFIG_PATH", None);
        let _g3 = set_env_guard("SECRETARY_LOG", None);
        let _g4 = set_env_guard("NO_COLOR", None);

        let config = EnvConfig::from_env();
        assert!(config.provider.is_none());
        assert!(config.config_path.is_none());
        assert!(config.log_filter.is_none());
        assert!(config.color());
    }

    #[test]
    fn values_are_read_when_set() {
        let _lock = env_lock();
        let _g1 = set_env_guard("SECRETARY_PROVIDER", Some("mock"));
        let _g2 = set_env_guard("SECRETARY_CONFIG_PATH", Some("/tmp/secretary.json"));
        let _g3 = set_env_guard("SECRETARY_LOG", Some("secretary=debug"));
        let _g4 = set_env_guard("NO_COLOR", Some("1"));

        let config = EnvConfig::from_env();
        assert_eq!(config.provider.as_deref(), Some("mock"));
        assert_eq!(config.config_path.as_deref(), Some("/tmp/secretary.json"));
        assert_eq!(config.log_filter.as_deref(), Some("secretary=debug"));
        assert!(!config.color());
    }

    #[test]
    fn blank_values_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("SECRETARY_PROVIDER", Some("  "));
        let _g2 = set_env_guard("NO_COLOR", Some(""));

        let config = EnvConfig::from_env();
        assert!(config.provider.is_none());
        assert!(config.color());
    }
}
