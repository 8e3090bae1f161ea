//! Gemini-backed implementation of the shared `assistant_provider` contract.
//!
//! This adapter turns a [`ChatSession`] into a `streamGenerateContent` request
//! and folds the transport's failure classification into [`BackendError`].

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use assistant_provider::{
    BackendError, BackendProfile, CancelSignal, ChatBackend, ChatRole, ChatSession,
    ProviderInitError,
};
use gemini_api::url::DEFAULT_GEMINI_MODEL;
use gemini_api::{
    Content, FailureKind, GeminiApiClient, GeminiApiConfig, GeminiApiError,
    GenerateContentRequest, StreamResult,
};

/// Stable provider identifier used for startup selection.
pub const GEMINI_PROVIDER_ID: &str = "gemini";

/// Runtime configuration for the Gemini provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiProviderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl GeminiProviderConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_gemini_api_config(self) -> GeminiApiConfig {
        let mut config = GeminiApiConfig::new(self.api_key).with_model(sanitize_model_id(&self.model));

        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

trait StreamClient: Send + Sync {
    fn stream(
        &self,
        request: &GenerateContentRequest,
        cancel: &CancelSignal,
    ) -> Result<StreamResult, GeminiApiError>;
}

#[derive(Debug)]
struct DefaultStreamClient {
    client: GeminiApiClient,
}

impl StreamClient for DefaultStreamClient {
    fn stream(
        &self,
        request: &GenerateContentRequest,
        cancel: &CancelSignal,
    ) -> Result<StreamResult, GeminiApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                GeminiApiError::Unknown(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(self.client.stream(request, Some(cancel)))
    }
}

/// `ChatBackend` adapter backed by `gemini_api` transport primitives.
pub struct GeminiProvider {
    model: Mutex<String>,
    stream_client: Arc<dyn StreamClient>,
}

impl GeminiProvider {
    /// Creates a provider using real Gemini transport.
    pub fn new(config: GeminiProviderConfig) -> Result<Self, ProviderInitError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderInitError::new(
                "Failed to initialize gemini provider: API key is empty",
            ));
        }

        let model = sanitize_model_id(&config.model);
        let stream_client = Arc::new(DefaultStreamClient {
            client: GeminiApiClient::new(config.into_gemini_api_config()).map_err(map_init_error)?,
        });

        Ok(Self {
            model: Mutex::new(model),
            stream_client,
        })
    }

    fn selected_model(&self) -> String {
        lock_unpoisoned(&self.model).clone()
    }

    #[cfg(test)]
    fn with_stream_client_for_tests(model: &str, stream_client: Arc<dyn StreamClient>) -> Self {
        Self {
            model: Mutex::new(sanitize_model_id(model)),
            stream_client,
        }
    }
}

impl ChatBackend for GeminiProvider {
    fn profile(&self) -> BackendProfile {
        BackendProfile {
            provider_id: GEMINI_PROVIDER_ID.to_string(),
            model_id: self.selected_model(),
        }
    }

    fn set_model(&self, model_id: &str) -> Result<BackendProfile, String> {
        let model_id = model_id.trim();
        if model_id.is_empty() {
            return Err("Model id must not be empty".to_string());
        }
        *lock_unpoisoned(&self.model) = model_id.to_string();
        Ok(self.profile())
    }

    fn send(
        &self,
        session: &ChatSession,
        message: &str,
        cancel: &CancelSignal,
    ) -> Result<String, BackendError> {
        let request = build_request(session, message).with_model(self.selected_model());

        let result = self
            .stream_client
            .stream(&request, cancel)
            .map_err(map_transport_error)?;

        let text = result.text();
        if text.trim().is_empty() {
            let reason = result
                .finish_reason
                .map(|reason| reason.as_str().to_string())
                .unwrap_or_else(|| "no finish reason".to_string());
            return Err(BackendError::fatal(format!(
                "Gemini returned an empty reply ({reason})"
            )));
        }

        Ok(text)
    }
}

fn build_request(session: &ChatSession, message: &str) -> GenerateContentRequest {
    let mut contents: Vec<Content> = session
        .history()
        .iter()
        .map(|item| match item.role {
            ChatRole::User => Content::user(item.text.clone()),
            ChatRole::Assistant => Content::model(item.text.clone()),
        })
        .collect();
    contents.push(Content::user(message));

    GenerateContentRequest::new(Some(session.instructions().to_string()), contents)
}

fn map_transport_error(error: GeminiApiError) -> BackendError {
    if matches!(error, GeminiApiError::Cancelled) {
        return BackendError::Cancelled;
    }

    tracing::debug!(%error, "gemini send failed");
    match error.failure_kind() {
        FailureKind::RateLimited => BackendError::RateLimited(error.to_string()),
        FailureKind::Unavailable => BackendError::Unavailable(error.to_string()),
        FailureKind::Fatal => BackendError::fatal(format!("Gemini request failed: {error}")),
    }
}

fn sanitize_model_id(model: &str) -> String {
    let model = model.trim();
    if model.is_empty() {
        DEFAULT_GEMINI_MODEL.to_string()
    } else {
        model.to_string()
    }
}

fn map_init_error(error: GeminiApiError) -> ProviderInitError {
    ProviderInitError::new(format!("Failed to initialize gemini provider: {error}"))
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
