use serde::{Deserialize, Serialize};

use crate::error::ConfigStoreError;

/// Model used when the config file does not name one.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretaryConfig {
    #[serde(default)]
    pub jira_url: String,
    #[serde(default)]
    pub jira_email: String,
    #[serde(default)]
    pub jira_api_token: String,
    #[serde(default)]
    pub gemini_api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_model: Option<String>,
}

impl SecretaryConfig {
    /// Trims surrounding whitespace and any trailing `/` from the tracker URL.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.jira_url = self.jira_url.trim().trim_end_matches('/').to_string();
        self.jira_email = self.jira_email.trim().to_string();
        self.jira_api_token = self.jira_api_token.trim().to_string();
        self.gemini_api_key = self.gemini_api_key.trim().to_string();
        self.gemini_model = self
            .gemini_model
            .map(|model| model.trim().to_string())
            .filter(|model| !model.is_empty());
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.gemini_model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL)
    }

    /// Checks that every credential is present and the URL has a scheme.
    pub fn validate(&self) -> Result<(), ConfigStoreError> {
        let missing: Vec<&'static str> = [
            ("jira_url", &self.jira_url),
            ("jira_email", &self.jira_email),
            ("jira_api_token", &self.jira_api_token),
            ("gemini_api_key", &self.gemini_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(ConfigStoreError::Incomplete { missing });
        }

        if !(self.jira_url.starts_with("https://") || self.jira_url.starts_with("http://")) {
            return Err(ConfigStoreError::InvalidJiraUrl(self.jira_url.clone()));
        }

        Ok(())
    }
}
