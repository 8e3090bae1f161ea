//! Issue tracker boundary used by the runner and the submission pipeline.

use std::collections::BTreeMap;
use std::io;

use jira_api::{Issue, JiraApiError, JiraClient, JiraConfig};
use thiserror::Error;
use time::Date;
use tokio::runtime::{Builder, Runtime};

use crate::model::ParsedWorkLog;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Jira(#[from] JiraApiError),
    #[error("failed to start the tracker runtime: {0}")]
    Runtime(#[source] io::Error),
}

/// Blocking view of the tracker: issue queries, per-day totals and work logging.
pub trait Tracker {
    /// Open issues assigned to the current user.
    fn assigned_issues(&self) -> Result<Vec<Issue>, TrackerError>;

    /// Every open issue the assistant may map work onto.
    fn open_issues(&self) -> Result<Vec<Issue>, TrackerError>;

    /// Seconds the current user logged on each day of `[start, end]`.
    fn logged_seconds_by_day(
        &self,
        start: Date,
        end: Date,
    ) -> Result<BTreeMap<Date, u64>, TrackerError>;

    /// Commits one entry. Without `day` the tracker stamps it "now".
    fn log_work(&self, log: &ParsedWorkLog, day: Option<Date>) -> Result<(), TrackerError>;

    /// Seconds logged on a single day.
    fn logged_seconds_on(&self, day: Date) -> Result<u64, TrackerError> {
        let totals = self.logged_seconds_by_day(day, day)?;
        Ok(totals.get(&day).copied().unwrap_or(0))
    }
}

/// [`Tracker`] backed by the async Jira client on a private current-thread runtime.
pub struct JiraTracker {
    client: JiraClient,
    runtime: Runtime,
}

impl JiraTracker {
    pub fn new(config: JiraConfig) -> Result<Self, TrackerError> {
        let client = JiraClient::new(config)?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(TrackerError::Runtime)?;
        Ok(Self { client, runtime })
    }
}

impl Tracker for JiraTracker {
    fn assigned_issues(&self) -> Result<Vec<Issue>, TrackerError> {
        Ok(self.runtime.block_on(self.client.assigned_issues())?)
    }

    fn open_issues(&self) -> Result<Vec<Issue>, TrackerError> {
        Ok(self.runtime.block_on(self.client.open_issues())?)
    }

    fn logged_seconds_by_day(
        &self,
        start: Date,
        end: Date,
    ) -> Result<BTreeMap<Date, u64>, TrackerError> {
        Ok(self
            .runtime
            .block_on(self.client.logged_seconds_by_day(start, end))?)
    }

    fn log_work(&self, log: &ParsedWorkLog, day: Option<Date>) -> Result<(), TrackerError> {
        Ok(self.runtime.block_on(self.client.add_worklog(
            &log.issue_key,
            log.seconds,
            &log.description,
            day,
        ))?)
    }
}
