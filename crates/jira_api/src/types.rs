use serde::{Deserialize, Serialize};

/// A tracker issue reduced to what the interview needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub key: String,
    pub summary: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<SearchIssue>,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchIssue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct IssueFields {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: Option<IssueStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IssueStatus {
    #[serde(default)]
    pub name: String,
}

impl From<SearchIssue> for Issue {
    fn from(issue: SearchIssue) -> Self {
        Self {
            key: issue.key,
            summary: issue.fields.summary,
            status: issue
                .fields
                .status
                .map(|status| status.name)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Myself {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogAuthor {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub name: String,
}

impl WorklogAuthor {
    /// Cloud instances identify users by accountId, Server/DC by name.
    #[must_use]
    pub fn matches(&self, identity: &str) -> bool {
        !identity.is_empty() && (self.account_id == identity || self.name == identity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogEntry {
    #[serde(default)]
    pub author: WorklogAuthor,
    /// Start timestamp as sent by the tracker, e.g. `2026-03-02T09:00:00.000+0300`.
    #[serde(default)]
    pub started: String,
    #[serde(default)]
    pub time_spent_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WorklogList {
    #[serde(default)]
    pub worklogs: Vec<WorklogEntry>,
}

/// Body of a worklog creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorklog {
    pub time_spent_seconds: u64,
    pub comment: String,
    /// Omitted to let the tracker use the current time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
}
