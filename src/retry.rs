//! Backoff around backend calls.
//!
//! The wait schedule is a pure function of the attempt index; the sleeping
//! itself goes through [`Sleeper`] so tests can record waits instead of
//! spending them.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use assistant_provider::{BackendError, CancelSignal};

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How many times a transient failure is retried and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            unit: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Wait before retrying after the failed attempt `attempt` (0-based): 30s, 60s, 90s.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(attempt.saturating_add(1))
    }
}

/// Interruptible sleep.
pub trait Sleeper {
    /// Waits for `duration`, returning [`BackendError::Cancelled`] once `cancel` is raised.
    fn sleep(&self, duration: Duration, cancel: &CancelSignal) -> Result<(), BackendError>;
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration, cancel: &CancelSignal) -> Result<(), BackendError> {
        (**self).sleep(duration, cancel)
    }
}

/// Real sleeper that re-checks the cancellation flag every polling interval.
#[derive(Debug, Clone, Copy)]
pub struct PollingSleeper {
    pub interval: Duration,
}

impl Default for PollingSleeper {
    fn default() -> Self {
        Self {
            interval: CANCEL_POLL_INTERVAL,
        }
    }
}

impl Sleeper for PollingSleeper {
    fn sleep(&self, duration: Duration, cancel: &CancelSignal) -> Result<(), BackendError> {
        let deadline = Instant::now() + duration;
        loop {
            if cancel.load(Ordering::SeqCst) {
                return Err(BackendError::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep(self.interval.min(deadline - now));
        }
    }
}

/// Runs `call`, retrying transient failures per `policy`.
///
/// After the last retry wait the final attempt's outcome is returned as-is.
/// Non-transient failures and cancellation propagate immediately.
pub fn call_with_retry<T>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    cancel: &CancelSignal,
    on_retry: &mut dyn FnMut(&BackendError, Duration),
    mut call: impl FnMut() -> Result<T, BackendError>,
) -> Result<T, BackendError> {
    for attempt in 0..policy.max_retries {
        if cancel.load(Ordering::SeqCst) {
            return Err(BackendError::Cancelled);
        }

        match call() {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() => {
                let wait = policy.backoff(attempt);
                tracing::warn!(attempt, ?wait, %error, "transient backend failure, retrying");
                on_retry(&error, wait);
                sleeper.sleep(wait, cancel)?;
            }
            Err(error) => return Err(error),
        }
    }

    if cancel.load(Ordering::SeqCst) {
        return Err(BackendError::Cancelled);
    }
    call()
}
