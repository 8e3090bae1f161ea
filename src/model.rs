//! Values passed between the interview, the extractor and submission.

use serde::Deserialize;

/// One raw entry as emitted by the assistant, before duration parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkLogCandidate {
    #[serde(default)]
    pub issue_key: String,
    #[serde(default)]
    pub time_spent: String,
    #[serde(default)]
    pub description: String,
}

/// The structured payload the assistant emits once the user confirms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InterviewPayload {
    #[serde(default)]
    pub work_logs: Vec<WorkLogCandidate>,
    #[serde(default)]
    pub ready_to_submit: bool,
}

/// A committable entry. `seconds` is always positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWorkLog {
    pub issue_key: String,
    pub seconds: u64,
    pub description: String,
}

impl ParsedWorkLog {
    #[must_use]
    pub fn new(issue_key: impl Into<String>, seconds: u64, description: impl Into<String>) -> Self {
        Self {
            issue_key: issue_key.into(),
            seconds,
            description: description.into(),
        }
    }
}

/// Sum of seconds over a batch of entries.
#[must_use]
pub fn total_seconds(logs: &[ParsedWorkLog]) -> u64 {
    logs.iter().map(|log| log.seconds).fold(0, u64::saturating_add)
}
