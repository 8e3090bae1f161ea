//! Committing confirmed entries to the tracker, one at a time.
//!
//! The tracker has no multi-entry transaction, so a batch is best effort:
//! every entry is attempted in order and a failure never rolls back or
//! skips the others.

use assistant_provider::CancelSignal;
use time::Date;

use crate::console::{confirm, Console, ConsoleError};
use crate::display::{self, Palette};
use crate::model::ParsedWorkLog;
use crate::tracker::Tracker;

/// Result of one submitted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub log: ParsedWorkLog,
    /// `None` when the tracker accepted the entry.
    pub error: Option<String>,
}

impl EntryOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    pub outcomes: Vec<EntryOutcome>,
}

impl SubmissionReport {
    /// Seconds the tracker actually accepted.
    #[must_use]
    pub fn committed_seconds(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.succeeded())
            .map(|outcome| outcome.log.seconds)
            .fold(0, u64::saturating_add)
    }

    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.succeeded()).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }
}

/// Submits every entry in order, reporting each outcome through `on_entry`.
pub fn submit_all(
    tracker: &dyn Tracker,
    logs: &[ParsedWorkLog],
    day: Option<Date>,
    on_entry: &mut dyn FnMut(&EntryOutcome),
) -> SubmissionReport {
    let mut report = SubmissionReport::default();
    for log in logs {
        let error = match tracker.log_work(log, day) {
            Ok(()) => None,
            Err(error) => {
                tracing::warn!(issue = %log.issue_key, seconds = log.seconds, %error, "worklog rejected");
                Some(error.to_string())
            }
        };
        let outcome = EntryOutcome {
            log: log.clone(),
            error,
        };
        on_entry(&outcome);
        report.outcomes.push(outcome);
    }
    report
}

/// Shows the summary, asks for confirmation and submits.
///
/// Returns `None` when the user declines; nothing is sent in that case.
pub fn confirm_and_submit(
    console: &mut dyn Console,
    tracker: &dyn Tracker,
    palette: &Palette,
    logs: &[ParsedWorkLog],
    day: Option<Date>,
    already_logged: Option<u64>,
    cancel: &CancelSignal,
) -> Result<Option<SubmissionReport>, ConsoleError> {
    console.print(&display::summary(palette, logs, already_logged));
    if !confirm(console, "Submit these entries?", cancel)? {
        console.print(&display::declined(palette));
        return Ok(None);
    }

    let report = submit_all(tracker, logs, day, &mut |outcome| {
        console.print(&display::entry_outcome(palette, outcome));
    });
    console.print(&display::submission_result(palette, &report));
    Ok(Some(report))
}
