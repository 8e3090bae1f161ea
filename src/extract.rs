//! Locating and decoding the structured work-log payload inside free-form replies.
//!
//! The search is heuristic by nature; it stays behind [`extract_work_logs`]
//! so the location strategy can be tightened without touching the interview.

use crate::duration::parse_duration;
use crate::model::{InterviewPayload, ParsedWorkLog};

const TAGGED_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Returns the confirmed entries, or `None` while the reply is not ready.
///
/// Not ready covers: no payload found, undecodable payload, a false
/// `ready_to_submit` flag, and a payload whose every entry has a zero or
/// unparseable duration.
#[must_use]
pub fn extract_work_logs(text: &str) -> Option<Vec<ParsedWorkLog>> {
    let located = locate_payload(text)?;
    let payload: InterviewPayload = serde_json::from_str(located).ok()?;
    if !payload.ready_to_submit {
        return None;
    }

    let logs: Vec<ParsedWorkLog> = payload
        .work_logs
        .into_iter()
        .filter_map(|candidate| {
            let seconds = parse_duration(&candidate.time_spent);
            (seconds > 0).then(|| {
                ParsedWorkLog::new(candidate.issue_key.trim(), seconds, candidate.description)
            })
        })
        .collect();

    (!logs.is_empty()).then_some(logs)
}

/// Finds the payload substring; the first matching strategy wins.
fn locate_payload(text: &str) -> Option<&str> {
    if let Some(start) = text.find(TAGGED_FENCE) {
        let rest = &text[start + TAGGED_FENCE.len()..];
        let end = rest.find(FENCE)?;
        return non_empty(rest[..end].trim());
    }

    if text.contains(FENCE) && text.contains('{') {
        let mut parts = text.splitn(3, FENCE);
        parts.next();
        return parts.next().map(str::trim).and_then(non_empty);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Removes the payload block so the user only sees the conversational part.
#[must_use]
pub fn strip_payload(text: &str) -> &str {
    if let Some(start) = text.find(TAGGED_FENCE) {
        return text[..start].trim();
    }

    if text.contains(FENCE) && text.contains('{') {
        return text.split(FENCE).next().unwrap_or_default().trim();
    }

    if text.contains("\"work_logs\"") {
        if let Some(start) = text.find('{') {
            return text[..start].trim();
        }
    }

    text
}
