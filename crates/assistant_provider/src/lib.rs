//! Minimal provider-agnostic contract for a conversational assistant backend.
//!
//! This crate defines only the chat session value, the send operation and the
//! tagged failure taxonomy the interview driver relies on. It excludes
//! transport details, wire payloads and retry policy.

use std::fmt;
use std::sync::{atomic::AtomicBool, Arc};

/// Shared cancellation flag propagated from the process interrupt handler.
pub type CancelSignal = Arc<AtomicBool>;

/// Error returned while constructing/configuring a backend before any session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    /// Creates a new provider initialization error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Failure reported by a backend for one send.
///
/// Providers classify their transport failures into these tags; callers never
/// inspect message text to decide whether to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend is throttling requests (quota or rate limit).
    RateLimited(String),
    /// The backend is temporarily unavailable.
    Unavailable(String),
    /// The send was aborted through the cancellation signal.
    Cancelled,
    /// Any other failure. Not retried.
    Fatal(String),
}

impl BackendError {
    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// Returns true for failures worth retrying after a wait.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Unavailable(_))
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited(message) => write!(f, "rate limited: {message}"),
            Self::Unavailable(message) => write!(f, "backend unavailable: {message}"),
            Self::Cancelled => write!(f, "request was cancelled"),
            Self::Fatal(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for BackendError {}

/// Author of one message in a chat history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Provider-neutral chat history item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// One conversation with a backend: system instructions plus the exchanged history.
///
/// The session is an explicit value owned by its caller. Backends read it on
/// every send and never keep conversation state of their own, so two sessions
/// can never leak into each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    instructions: String,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    #[must_use]
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    #[must_use]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Records a completed exchange. Failed sends are never recorded.
    pub fn record_exchange(&mut self, user: impl Into<String>, reply: impl Into<String>) {
        self.history.push(ChatMessage::user(user));
        self.history.push(ChatMessage::assistant(reply));
    }

    /// Number of completed exchanges.
    #[must_use]
    pub fn exchanges(&self) -> usize {
        self.history.len() / 2
    }
}

/// Immutable metadata describing a chat backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Backend interface for one conversational turn.
pub trait ChatBackend: Send + Sync {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> BackendProfile;

    /// Switches the model used for future sends.
    ///
    /// Backends may return an error when model switching is unsupported.
    fn set_model(&self, _model_id: &str) -> Result<BackendProfile, String> {
        Err("Model switching is not supported by this provider".to_string())
    }

    /// Sends `message` as the next user turn of `session` and returns the reply text.
    ///
    /// The caller records the exchange on success. Implementations must return
    /// [`BackendError::Cancelled`] promptly once `cancel` is raised.
    fn send(
        &self,
        session: &ChatSession,
        message: &str,
        cancel: &CancelSignal,
    ) -> Result<String, BackendError>;
}
