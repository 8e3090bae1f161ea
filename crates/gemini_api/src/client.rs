use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};

use crate::config::GeminiApiConfig;
use crate::error::{status_error, GeminiApiError};
use crate::events::{FinishReason, GeminiStreamEvent};
use crate::headers::build_headers;
use crate::payload::GenerateContentRequest;
use crate::retry::classify_failure;
use crate::sse::SseStreamParser;
use crate::url::normalize_gemini_url;

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct GeminiApiClient {
    http: Client,
    config: GeminiApiConfig,
}

#[derive(Debug, Clone)]
pub struct StreamResult {
    pub events: Vec<GeminiStreamEvent>,
    pub finish_reason: Option<FinishReason>,
}

impl StreamResult {
    /// Concatenated text of every delta in stream order.
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|event| match event {
                GeminiStreamEvent::TextDelta { delta } => Some(delta.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl GeminiApiClient {
    pub fn new(config: GeminiApiConfig) -> Result<Self, GeminiApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(GeminiApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeminiApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_gemini_url(&self.config.base_url, &self.config.model)
    }

    fn endpoint_for(&self, request: &GenerateContentRequest) -> String {
        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(&self.config.model);
        normalize_gemini_url(&self.config.base_url, model)
    }

    pub fn build_headers(&self, user_agent: Option<&str>) -> Result<HeaderMap, GeminiApiError> {
        let headers = build_headers(&self.config, user_agent)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| GeminiApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    GeminiApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::RequestBuilder, GeminiApiError> {
        validate_request_payload_shape(request)?;

        let headers = self.build_headers(self.config.user_agent.as_deref())?;
        Ok(self
            .http
            .post(self.endpoint_for(request))
            .headers(headers)
            .json(request))
    }

    /// Performs exactly one HTTP attempt; non-success statuses come back classified.
    pub async fn send(
        &self,
        request: &GenerateContentRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Response, GeminiApiError> {
        if is_cancelled(cancellation) {
            return Err(GeminiApiError::Cancelled);
        }

        let response = self.build_request(request)?.send();
        let response = await_or_cancel(response, cancellation)
            .await?
            .map_err(GeminiApiError::from)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = await_or_cancel(response.text(), cancellation)
            .await?
            .unwrap_or_default();
        let error = status_error(status, &body);
        tracing::debug!(%status, kind = ?error.failure_kind(), "gemini request failed");
        Err(error)
    }

    pub async fn stream_with_handler<F>(
        &self,
        request: &GenerateContentRequest,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<Option<FinishReason>, GeminiApiError>
    where
        F: FnMut(GeminiStreamEvent),
    {
        let response = self.send(request, cancellation).await?;
        let mut bytes = response.bytes_stream();
        let mut parser = SseStreamParser::default();
        let mut finish_reason = None;

        loop {
            let Some(chunk) = await_or_cancel(bytes.next(), cancellation).await? else {
                break;
            };
            if is_cancelled(cancellation) {
                return Err(GeminiApiError::Cancelled);
            }
            let chunk = chunk.map_err(GeminiApiError::from)?;
            for event in parser.feed(&chunk) {
                process_stream_event(event, &mut finish_reason, &mut on_event)?;
            }
        }

        if is_cancelled(cancellation) {
            return Err(GeminiApiError::Cancelled);
        }

        tracing::debug!(finish_reason = ?finish_reason, "gemini stream ended");
        Ok(finish_reason)
    }

    pub async fn stream(
        &self,
        request: &GenerateContentRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<StreamResult, GeminiApiError> {
        let mut events = Vec::new();
        let finish_reason = self
            .stream_with_handler(request, cancellation, |event| {
                events.push(event);
            })
            .await?;

        Ok(StreamResult {
            events,
            finish_reason,
        })
    }
}

fn validate_request_payload_shape(request: &GenerateContentRequest) -> Result<(), GeminiApiError> {
    if request.contents.is_empty() {
        return Err(GeminiApiError::InvalidRequestPayload(
            "'contents' must hold at least one turn".to_owned(),
        ));
    }

    if request.contents.last().and_then(|content| content.role.as_deref())
        != Some(crate::payload::ROLE_USER)
    {
        return Err(GeminiApiError::InvalidRequestPayload(
            "the last turn in 'contents' must come from the user".to_owned(),
        ));
    }

    Ok(())
}

fn process_stream_event<F>(
    event: GeminiStreamEvent,
    finish_reason: &mut Option<FinishReason>,
    on_event: &mut F,
) -> Result<(), GeminiApiError>
where
    F: FnMut(GeminiStreamEvent),
{
    match &event {
        GeminiStreamEvent::Error {
            code,
            status,
            message,
        } => {
            let message = message
                .clone()
                .or_else(|| status.clone())
                .unwrap_or_else(|| "Gemini stream reported an error".to_owned());
            return Err(GeminiApiError::StreamFailed {
                kind: classify_failure(code.unwrap_or(0), status.as_deref(), &message),
                message,
            });
        }
        GeminiStreamEvent::Blocked { reason } => {
            return Err(GeminiApiError::Blocked {
                reason: reason.clone(),
            });
        }
        GeminiStreamEvent::Finished { reason } => *finish_reason = Some(*reason),
        GeminiStreamEvent::TextDelta { .. } => {}
    }

    on_event(event);
    Ok(())
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, GeminiApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(GeminiApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(GeminiApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
