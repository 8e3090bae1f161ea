//! Transport-only Gemini API client primitives.
//!
//! This crate owns request building, SSE parsing and error classification for
//! the `streamGenerateContent` endpoint only. It contains no conversation state
//! and never retries: failures are returned with a [`FailureKind`] so callers
//! can apply their own backoff policy.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod retry;
pub mod sse;
pub mod url;

pub use client::GeminiApiClient;
pub use client::{CancellationSignal, StreamResult};
pub use config::GeminiApiConfig;
pub use error::{FailureKind, GeminiApiError};
pub use events::{FinishReason, GeminiStreamEvent};
pub use payload::{Content, GenerateContentRequest, Part};
pub use sse::SseStreamParser;
pub use url::normalize_gemini_url;
