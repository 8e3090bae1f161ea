//! Failure classification for transient backend conditions.
//!
//! The transport never retries on its own; it only tags failures so the
//! caller's backoff loop can tell rate limiting and temporary unavailability
//! apart from everything else.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::FailureKind;

fn rate_limit_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)resource.?exhausted|rate.?limit|quota").expect("rate limit regex must compile")
    })
}

fn unavailable_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)\bunavailable\b|overloaded").expect("unavailable regex must compile")
    })
}

/// Classify a failure from its HTTP status, the payload `status` field and the message.
///
/// Status code and payload status take precedence; the message text is only
/// consulted for in-stream errors that carry neither.
pub fn classify_failure(status: u16, status_text: Option<&str>, error_text: &str) -> FailureKind {
    match (status, status_text) {
        (429, _) | (_, Some("RESOURCE_EXHAUSTED")) => return FailureKind::RateLimited,
        (503, _) | (_, Some("UNAVAILABLE")) => return FailureKind::Unavailable,
        _ => {}
    }

    if status != 0 {
        return FailureKind::Fatal;
    }

    if rate_limit_regex().is_match(error_text) {
        FailureKind::RateLimited
    } else if unavailable_regex().is_match(error_text) {
        FailureKind::Unavailable
    } else {
        FailureKind::Fatal
    }
}

/// True when the classified failure is worth another attempt.
pub fn is_retryable_failure(kind: FailureKind) -> bool {
    matches!(kind, FailureKind::RateLimited | FailureKind::Unavailable)
}
