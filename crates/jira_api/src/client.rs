use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use time::Date;

use crate::error::JiraApiError;
use crate::jql;
use crate::types::{Issue, Myself, NewWorklog, SearchResponse, WorklogEntry, WorklogList};
use crate::worklog::{format_started, logged_seconds_by_day};

const SEARCH_PAGE_SIZE: usize = 100;
const SEARCH_FIELDS: &str = "summary,status";

/// Connection settings for one Jira instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraConfig {
    pub base_url: String,
    pub api_token: String,
    pub timeout: Option<Duration>,
}

impl JiraConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug)]
pub struct JiraClient {
    http: Client,
    base_url: Url,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self, JiraApiError> {
        let token = config.api_token.trim();
        if token.is_empty() {
            return Err(JiraApiError::MissingToken);
        }

        let trimmed = config.base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|error| JiraApiError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: error.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(JiraApiError::InvalidBaseUrl {
                url: trimmed.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            JiraApiError::InvalidBaseUrl {
                url: trimmed.to_string(),
                reason: "API token contains characters not allowed in a header".to_string(),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// Builds `{base}/rest/api/2/{segments...}`, escaping every segment.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["rest", "api", "2"]).extend(segments);
        }
        url
    }

    /// Runs a JQL search, following `startAt` pagination to the reported total.
    pub async fn search_issues(&self, jql: &str) -> Result<Vec<Issue>, JiraApiError> {
        let mut issues = Vec::new();
        let mut start_at = 0usize;

        loop {
            let mut url = self.endpoint(&["search"]);
            url.query_pairs_mut()
                .append_pair("jql", jql)
                .append_pair("fields", SEARCH_FIELDS)
                .append_pair("maxResults", &SEARCH_PAGE_SIZE.to_string())
                .append_pair("startAt", &start_at.to_string());

            let page: SearchResponse = self.get_json(url, "search").await?;
            let received = page.issues.len();
            issues.extend(page.issues.into_iter().map(Issue::from));
            start_at += received;

            tracing::debug!(received, start_at, total = page.total, "jira search page");
            if received == 0 || start_at >= page.total {
                break;
            }
        }

        Ok(issues)
    }

    pub async fn assigned_issues(&self) -> Result<Vec<Issue>, JiraApiError> {
        self.search_issues(jql::ASSIGNED_OPEN_ISSUES).await
    }

    pub async fn open_issues(&self) -> Result<Vec<Issue>, JiraApiError> {
        self.search_issues(jql::ALL_OPEN_ISSUES).await
    }

    /// The current user's identity: accountId, or name on instances without one.
    pub async fn myself(&self) -> Result<String, JiraApiError> {
        let me: Myself = self.get_json(self.endpoint(&["myself"]), "myself").await?;
        if !me.account_id.is_empty() {
            Ok(me.account_id)
        } else if !me.name.is_empty() {
            Ok(me.name)
        } else {
            Err(JiraApiError::MissingIdentity)
        }
    }

    pub async fn issue_worklogs(&self, issue_key: &str) -> Result<Vec<WorklogEntry>, JiraApiError> {
        let list: WorklogList = self
            .get_json(self.endpoint(&["issue", issue_key, "worklog"]), "worklog")
            .await?;
        Ok(list.worklogs)
    }

    /// Logs `seconds` on `issue_key`; without `day` the tracker records "now".
    pub async fn add_worklog(
        &self,
        issue_key: &str,
        seconds: u64,
        comment: &str,
        day: Option<Date>,
    ) -> Result<(), JiraApiError> {
        let body = NewWorklog {
            time_spent_seconds: seconds,
            comment: comment.to_string(),
            started: day.map(format_started),
        };

        let response = self
            .http
            .post(self.endpoint(&["issue", issue_key, "worklog"]))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        tracing::debug!(issue_key, seconds, "jira worklog created");
        Ok(())
    }

    /// Seconds logged by the current user on each day of `[start, end]`.
    ///
    /// Issues whose worklogs cannot be listed are skipped with a warning.
    pub async fn logged_seconds_by_day(
        &self,
        start: Date,
        end: Date,
    ) -> Result<BTreeMap<Date, u64>, JiraApiError> {
        let identity = self.myself().await?;
        let issues = self.search_issues(&jql::worklogs_in_range(start, end)).await?;

        let mut entries = Vec::new();
        for issue in &issues {
            match self.issue_worklogs(&issue.key).await {
                Ok(found) => entries.extend(found),
                Err(error) => {
                    tracing::warn!(issue = %issue.key, %error, "skipping issue with unreadable worklogs");
                }
            }
        }

        Ok(logged_seconds_by_day(&entries, &identity, start, end))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        what: &'static str,
    ) -> Result<T, JiraApiError> {
        let response = self.http.get(url).send().await?;
        let response = ensure_success(response).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| JiraApiError::decode(what, source))
    }
}

async fn ensure_success(response: Response) -> Result<Response, JiraApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(JiraApiError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}
