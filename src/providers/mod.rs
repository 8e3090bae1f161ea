use std::sync::Arc;
use std::time::Duration;

use assistant_provider::ChatBackend;
use assistant_provider_gemini::{GeminiProvider, GeminiProviderConfig, GEMINI_PROVIDER_ID};
use assistant_provider_mock::{ScriptedBackend, MOCK_PROVIDER_ID};
use config_store::SecretaryConfig;

pub const DEFAULT_PROVIDER_ID: &str = GEMINI_PROVIDER_ID;
pub const PROVIDER_ENV_VAR: &str = "SECRETARY_PROVIDER";

const GEMINI_TIMEOUT: Duration = Duration::from_secs(120);

/// Resolves the backend named by `provider_id`, defaulting to Gemini.
pub fn provider_from_settings(
    provider_id: Option<&str>,
    config: &SecretaryConfig,
) -> Result<Arc<dyn ChatBackend>, String> {
    let provider_id = provider_id
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_PROVIDER_ID);

    provider_for_id(provider_id, config)
}

pub fn provider_for_id(
    provider_id: &str,
    config: &SecretaryConfig,
) -> Result<Arc<dyn ChatBackend>, String> {
    match provider_id {
        GEMINI_PROVIDER_ID => {
            let provider_config =
                GeminiProviderConfig::new(config.gemini_api_key.clone(), config.model())
                    .with_timeout(GEMINI_TIMEOUT);
            let provider = GeminiProvider::new(provider_config).map_err(|error| error.to_string())?;
            Ok(Arc::new(provider))
        }
        MOCK_PROVIDER_ID => Ok(Arc::new(ScriptedBackend::default())),
        unknown => Err(format!(
            "Unsupported provider '{unknown}'. Available providers: {GEMINI_PROVIDER_ID}, {MOCK_PROVIDER_ID}"
        )),
    }
}
