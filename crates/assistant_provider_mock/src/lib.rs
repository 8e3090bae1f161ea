//! Deterministic scripted implementation of the shared `assistant_provider` contract.
//!
//! This crate contains no transport/protocol logic and is intended for local
//! development and contract-level integration testing.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use assistant_provider::{BackendError, BackendProfile, CancelSignal, ChatBackend, ChatSession};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// One scripted outcome, consumed by exactly one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    Text(String),
    Fail(BackendError),
    /// Blocks the send until the cancellation signal is raised.
    BlockUntilCancelled,
}

impl ScriptedReply {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// A send observed by the scripted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedSend {
    pub message: String,
    pub instructions: String,
    pub prior_exchanges: usize,
}

#[derive(Debug, Default)]
struct ScriptState {
    replies: VecDeque<ScriptedReply>,
    observed: Vec<ObservedSend>,
    model_id: String,
}

/// Scripted backend used by interview tests and `SECRETARY_PROVIDER=mock` runs.
///
/// Replies are served in order; once the script is exhausted every send echoes
/// the user message back.
#[derive(Debug)]
pub struct ScriptedBackend {
    state: Mutex<ScriptState>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            state: Mutex::new(ScriptState {
                replies: replies.into_iter().collect(),
                observed: Vec::new(),
                model_id: "mock".to_string(),
            }),
        }
    }

    /// Convenience constructor for a script of plain text replies.
    #[must_use]
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|text| ScriptedReply::Text(text.into())))
    }

    pub fn push(&self, reply: ScriptedReply) {
        lock_unpoisoned(&self.state).replies.push_back(reply);
    }

    /// Every send observed so far, failed ones included.
    #[must_use]
    pub fn observed(&self) -> Vec<ObservedSend> {
        lock_unpoisoned(&self.state).observed.clone()
    }

    #[must_use]
    pub fn send_count(&self) -> usize {
        lock_unpoisoned(&self.state).observed.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        lock_unpoisoned(&self.state).replies.len()
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::with_texts([
            "Hi! This is the offline mock assistant. Tell me what you worked on and \
             I will repeat it back."
                .to_string(),
        ])
    }
}

impl ChatBackend for ScriptedBackend {
    fn profile(&self) -> BackendProfile {
        BackendProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: lock_unpoisoned(&self.state).model_id.clone(),
        }
    }

    fn set_model(&self, model_id: &str) -> Result<BackendProfile, String> {
        let model_id = model_id.trim();
        if model_id.is_empty() {
            return Err("Model id must not be empty".to_string());
        }
        lock_unpoisoned(&self.state).model_id = model_id.to_string();
        Ok(self.profile())
    }

    fn send(
        &self,
        session: &ChatSession,
        message: &str,
        cancel: &CancelSignal,
    ) -> Result<String, BackendError> {
        let reply = {
            let mut state = lock_unpoisoned(&self.state);
            state.observed.push(ObservedSend {
                message: message.to_string(),
                instructions: session.instructions().to_string(),
                prior_exchanges: session.exchanges(),
            });
            state.replies.pop_front()
        };

        if cancel.load(Ordering::SeqCst) {
            return Err(BackendError::Cancelled);
        }

        match reply {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Fail(error)) => Err(error),
            Some(ScriptedReply::BlockUntilCancelled) => {
                while !cancel.load(Ordering::SeqCst) {
                    thread::sleep(CANCEL_POLL_INTERVAL);
                }
                Err(BackendError::Cancelled)
            }
            None => Ok(format!("(mock) You said: {message}")),
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use super::*;

    fn cancel_signal(raised: bool) -> CancelSignal {
        Arc::new(AtomicBool::new(raised))
    }

    #[test]
    fn replies_are_served_in_script_order_then_echo() {
        let backend = ScriptedBackend::with_texts(["one", "two"]);
        let session = ChatSession::new("sys");
        let cancel = cancel_signal(false);

        assert_eq!(backend.send(&session, "a", &cancel).as_deref(), Ok("one"));
        assert_eq!(backend.send(&session, "b", &cancel).as_deref(), Ok("two"));
        assert_eq!(
            backend.send(&session, "c", &cancel).as_deref(),
            Ok("(mock) You said: c")
        );
        assert_eq!(backend.remaining(), 0);
    }

    #[test]
    fn scripted_failures_are_returned_and_observed() {
        let backend = ScriptedBackend::new([ScriptedReply::Fail(BackendError::RateLimited(
            "slow down".to_string(),
        ))]);
        let session = ChatSession::new("sys");

        let error = backend
            .send(&session, "hello", &cancel_signal(false))
            .expect_err("scripted failure should surface");

        assert!(error.is_transient());
        assert_eq!(backend.send_count(), 1);
        assert_eq!(backend.observed()[0].message, "hello");
        assert_eq!(backend.observed()[0].instructions, "sys");
    }

    #[test]
    fn raised_cancel_wins_over_script() {
        let backend = ScriptedBackend::with_texts(["never"]);
        let session = ChatSession::new("sys");

        let error = backend
            .send(&session, "hello", &cancel_signal(true))
            .expect_err("cancelled send should fail");

        assert_eq!(error, BackendError::Cancelled);
    }

    #[test]
    fn blocking_reply_returns_once_cancel_is_raised() {
        let backend = ScriptedBackend::new([ScriptedReply::BlockUntilCancelled]);
        let session = ChatSession::new("sys");
        let cancel = cancel_signal(false);
        let raiser = Arc::clone(&cancel);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            raiser.store(true, Ordering::SeqCst);
        });

        let error = backend
            .send(&session, "hello", &cancel)
            .expect_err("blocked send should be cancelled");
        handle.join().expect("raiser thread should finish");

        assert_eq!(error, BackendError::Cancelled);
    }

    #[test]
    fn model_switch_updates_profile_and_rejects_blank_ids() {
        let backend = ScriptedBackend::default();
        assert_eq!(backend.profile().provider_id, MOCK_PROVIDER_ID);

        let profile = backend.set_model(" mock-alt ").expect("switch should succeed");
        assert_eq!(profile.model_id, "mock-alt");
        assert!(backend.set_model("  ").is_err());
    }
}
