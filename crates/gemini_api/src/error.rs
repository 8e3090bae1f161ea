use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

use crate::retry::classify_failure;

/// Retry-relevant classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited,
    Unavailable,
    Fatal,
}

#[derive(Debug)]
pub enum GeminiApiError {
    MissingApiKey,
    InvalidHeader(String),
    InvalidRequestPayload(String),
    Request(reqwest::Error),
    Status {
        status: StatusCode,
        kind: FailureKind,
        message: String,
    },
    Serde(JsonError),
    StreamFailed {
        kind: FailureKind,
        message: String,
    },
    Blocked {
        reason: String,
    },
    Cancelled,
    Unknown(String),
}

impl GeminiApiError {
    /// Classification used by callers to decide whether to retry.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Status { kind, .. } | Self::StreamFailed { kind, .. } => *kind,
            _ => FailureKind::Fatal,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub code: Option<u16>,
    pub message: Option<String>,
    pub status: Option<String>,
}

impl fmt::Display for GeminiApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "Gemini API key is required"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::InvalidRequestPayload(message) => write!(f, "invalid request payload: {message}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status {
                status, message, ..
            } => write!(f, "HTTP {status} {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::StreamFailed { message, .. } => write!(f, "stream failed: {message}"),
            Self::Blocked { reason } => write!(f, "response blocked by the backend ({reason})"),
            Self::Cancelled => write!(f, "request was cancelled"),
            Self::Unknown(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for GeminiApiError {}

impl From<reqwest::Error> for GeminiApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for GeminiApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Build a classified status error from a non-success response body.
pub fn status_error(status: StatusCode, body: &str) -> GeminiApiError {
    let parsed = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.value);
    let status_text = parsed.as_ref().and_then(|fields| fields.status.as_deref());
    let message = parse_error_message(status, body);
    let kind = classify_failure(status.as_u16(), status_text, &message);

    GeminiApiError::Status {
        status,
        kind,
        message,
    }
}

pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.trim().to_string()
        }
    };

    let Ok(parsed) = serde_json::from_str::<ErrorPayload>(body) else {
        return fallback();
    };
    let Some(fields) = parsed.value else {
        return fallback();
    };

    let message = fields
        .message
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let status_text = fields
        .status
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match (status_text, message) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (None, Some(message)) => message.to_string(),
        (Some(code), None) => code.to_string(),
        (None, None) => fallback(),
    }
}
