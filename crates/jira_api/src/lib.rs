//! Issue tracker transport for the Jira REST API (v2).
//!
//! Covers exactly what time logging needs: JQL issue search, the current
//! user's identity, per-issue worklog listing, worklog creation and the
//! per-day aggregation of the current user's logged time.

pub mod client;
pub mod error;
pub mod jql;
pub mod types;
pub mod worklog;

pub use client::{JiraClient, JiraConfig};
pub use error::JiraApiError;
pub use types::{Issue, NewWorklog, WorklogAuthor, WorklogEntry};
pub use worklog::{format_iso_date, format_started, logged_seconds_by_day, parse_iso_date};
