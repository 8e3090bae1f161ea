use thiserror::Error;

#[derive(Debug, Error)]
pub enum JiraApiError {
    #[error("invalid Jira URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Jira API token is required")]
    MissingToken,

    #[error("jira request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("jira returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("current user has neither accountId nor name")]
    MissingIdentity,
}

impl JiraApiError {
    #[must_use]
    pub fn decode(what: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { what, source }
    }

    /// HTTP status for rejected requests, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
