#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use assistant_provider::{BackendError, CancelSignal};
use jira_api::{Issue, JiraApiError};
use secretary::console::{Console, ConsoleError};
use secretary::retry::Sleeper;
use secretary::tracker::{Tracker, TrackerError};
use secretary::ParsedWorkLog;
use time::Date;

pub fn cancel_signal() -> CancelSignal {
    Arc::new(AtomicBool::new(false))
}

pub fn issue(key: &str, summary: &str) -> Issue {
    Issue {
        key: key.to_string(),
        summary: summary.to_string(),
        status: "In Progress".to_string(),
    }
}

/// Wraps `entries` as an assistant reply carrying a confirmed payload.
pub fn ready_reply(entries: &[(&str, &str, &str)]) -> String {
    let logs: Vec<String> = entries
        .iter()
        .map(|(key, time, description)| {
            format!(
                r#"{{"issue_key": "{key}", "time_spent": "{time}", "description": "{description}"}}"#
            )
        })
        .collect();
    format!(
        "Perfect, here is the summary.\n```json\n{{\"work_logs\": [{}], \"ready_to_submit\": true}}\n```",
        logs.join(", ")
    )
}

#[derive(Debug, Clone)]
pub enum ScriptedInput {
    Line(String),
    /// Raises the cancellation flag instead of answering.
    Interrupt,
}

#[derive(Debug, Default)]
pub struct ConsoleTrace {
    pub printed: Vec<String>,
    pub prompts: Vec<String>,
    pub clears: usize,
}

impl ConsoleTrace {
    pub fn transcript(&self) -> String {
        self.printed.join("\n")
    }
}

/// Console fed from a script; end of script reads as end of input.
pub struct ScriptedConsole {
    inputs: VecDeque<ScriptedInput>,
    trace: Arc<Mutex<ConsoleTrace>>,
}

impl ScriptedConsole {
    pub fn new(lines: &[&str]) -> (Self, Arc<Mutex<ConsoleTrace>>) {
        Self::with_inputs(
            lines
                .iter()
                .map(|line| ScriptedInput::Line(line.to_string()))
                .collect(),
        )
    }

    pub fn with_inputs(inputs: Vec<ScriptedInput>) -> (Self, Arc<Mutex<ConsoleTrace>>) {
        let trace = Arc::new(Mutex::new(ConsoleTrace::default()));
        (
            Self {
                inputs: inputs.into(),
                trace: Arc::clone(&trace),
            },
            trace,
        )
    }
}

impl Console for ScriptedConsole {
    fn print(&mut self, text: &str) {
        lock_unpoisoned(&self.trace).printed.push(text.to_string());
    }

    fn read_line(
        &mut self,
        prompt: &str,
        cancel: &CancelSignal,
    ) -> Result<Option<String>, ConsoleError> {
        lock_unpoisoned(&self.trace).prompts.push(prompt.to_string());
        if cancel.load(Ordering::SeqCst) {
            return Err(ConsoleError::Interrupted);
        }
        match self.inputs.pop_front() {
            Some(ScriptedInput::Line(line)) => Ok(Some(line)),
            Some(ScriptedInput::Interrupt) => {
                cancel.store(true, Ordering::SeqCst);
                Err(ConsoleError::Interrupted)
            }
            None => Ok(None),
        }
    }

    fn clear(&mut self) {
        lock_unpoisoned(&self.trace).clears += 1;
    }
}

/// In-memory tracker recording every submitted entry.
#[derive(Default)]
pub struct RecordingTracker {
    pub assigned: Vec<Issue>,
    pub open: Vec<Issue>,
    logged: Mutex<BTreeMap<Date, u64>>,
    today: Option<Date>,
    failing_keys: BTreeSet<String>,
    submitted: Mutex<Vec<(ParsedWorkLog, Option<Date>)>>,
    attempts: Mutex<Vec<String>>,
}

impl RecordingTracker {
    pub fn with_issues(issues: Vec<Issue>) -> Self {
        Self {
            assigned: issues.clone(),
            open: issues,
            ..Self::default()
        }
    }

    pub fn with_logged(self, date: Date, seconds: u64) -> Self {
        lock_unpoisoned(&self.logged).insert(date, seconds);
        self
    }

    /// Day stamped on entries submitted without an explicit date.
    pub fn with_today(mut self, today: Date) -> Self {
        self.today = Some(today);
        self
    }

    pub fn failing_on(mut self, issue_key: &str) -> Self {
        self.failing_keys.insert(issue_key.to_string());
        self
    }

    pub fn submitted(&self) -> Vec<(ParsedWorkLog, Option<Date>)> {
        lock_unpoisoned(&self.submitted).clone()
    }

    /// Issue keys in the order submission was attempted, failures included.
    pub fn attempts(&self) -> Vec<String> {
        lock_unpoisoned(&self.attempts).clone()
    }

    pub fn logged_on(&self, date: Date) -> u64 {
        lock_unpoisoned(&self.logged).get(&date).copied().unwrap_or(0)
    }
}

impl Tracker for RecordingTracker {
    fn assigned_issues(&self) -> Result<Vec<Issue>, TrackerError> {
        Ok(self.assigned.clone())
    }

    fn open_issues(&self) -> Result<Vec<Issue>, TrackerError> {
        Ok(self.open.clone())
    }

    fn logged_seconds_by_day(
        &self,
        start: Date,
        end: Date,
    ) -> Result<BTreeMap<Date, u64>, TrackerError> {
        Ok(lock_unpoisoned(&self.logged)
            .range(start..=end)
            .map(|(date, seconds)| (*date, *seconds))
            .collect())
    }

    fn log_work(&self, log: &ParsedWorkLog, day: Option<Date>) -> Result<(), TrackerError> {
        lock_unpoisoned(&self.attempts).push(log.issue_key.clone());
        if self.failing_keys.contains(&log.issue_key) {
            return Err(TrackerError::Jira(JiraApiError::Status {
                status: 404,
                body: format!("Issue {} does not exist", log.issue_key),
            }));
        }
        if let Some(date) = day.or(self.today) {
            *lock_unpoisoned(&self.logged).entry(date).or_insert(0) += log.seconds;
        }
        lock_unpoisoned(&self.submitted).push((log.clone(), day));
        Ok(())
    }
}

/// Records requested waits without sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pub waits: Mutex<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration, cancel: &CancelSignal) -> Result<(), BackendError> {
        lock_unpoisoned(&self.waits).push(duration);
        if cancel.load(Ordering::SeqCst) {
            return Err(BackendError::Cancelled);
        }
        Ok(())
    }
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
