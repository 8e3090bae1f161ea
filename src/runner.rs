//! Today and period runs: issue context, day reconciliation, interviews and submission.

use assistant_provider::{CancelSignal, ChatBackend};
use jira_api::{format_iso_date, parse_iso_date, Issue};
use time::Date;

use crate::console::Console;
use crate::display::{self, Palette};
use crate::error::AppError;
use crate::interview::{Interview, InterviewOutcome};
use crate::prompt::DayContext;
use crate::retry::{PollingSleeper, RetryPolicy, Sleeper};
use crate::schedule::{plan_period, plan_today, DayStatus};
use crate::submit::confirm_and_submit;
use crate::tracker::Tracker;

/// What a finished run reports back to `main`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub committed_seconds: u64,
    pub days_submitted: usize,
    /// The process interrupt or the user stopped the run early.
    pub stopped_early: bool,
}

enum DayResult {
    Submitted(u64),
    Skipped,
    Stop,
}

pub struct Runner<'a> {
    tracker: &'a dyn Tracker,
    backend: &'a dyn ChatBackend,
    console: &'a mut dyn Console,
    cancel: CancelSignal,
    palette: Palette,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleeper + 'a>,
}

impl<'a> Runner<'a> {
    pub fn new(
        tracker: &'a dyn Tracker,
        backend: &'a dyn ChatBackend,
        console: &'a mut dyn Console,
        cancel: CancelSignal,
    ) -> Self {
        Self {
            tracker,
            backend,
            console,
            cancel,
            palette: Palette::plain(),
            policy: RetryPolicy::default(),
            sleeper: Box::new(PollingSleeper::default()),
        }
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, policy: RetryPolicy, sleeper: impl Sleeper + 'a) -> Self {
        self.policy = policy;
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Interviews for `today` unless it is already filled.
    pub fn run_today(&mut self, today: Date) -> Result<RunSummary, AppError> {
        self.console
            .print(&display::welcome(&self.palette, &self.backend.profile()));
        let Some(issues) = self.load_issues()? else {
            return Ok(self.finish(RunSummary::default()));
        };

        let logged = self.tracker.logged_seconds_on(today)?;
        let day = plan_today(today, logged);
        self.console.print(&display::today_status(&self.palette, &day));

        let mut summary = RunSummary::default();
        if day.filled {
            return Ok(self.finish(summary));
        }

        match self.process_day(&issues, &day, DayContext::today(logged), None) {
            Ok(DayResult::Submitted(seconds)) => {
                summary.committed_seconds = summary.committed_seconds.saturating_add(seconds);
                summary.days_submitted += 1;
            }
            Ok(DayResult::Skipped) => {}
            Ok(DayResult::Stop) | Err(AppError::Interrupted) => summary.stopped_early = true,
            Err(error) => return Err(error),
        }
        Ok(self.finish(summary))
    }

    /// Interviews every unfilled weekday of `[start, end]` in order.
    ///
    /// A cancelled day ends the run; a fatal failure aborts it. Days already
    /// submitted stay committed either way.
    pub fn run_period(&mut self, start: Date, end: Date) -> Result<RunSummary, AppError> {
        self.console
            .print(&display::welcome(&self.palette, &self.backend.profile()));
        let Some(issues) = self.load_issues()? else {
            return Ok(self.finish(RunSummary::default()));
        };

        let logged = self.tracker.logged_seconds_by_day(start, end)?;
        let plan = plan_period(start, end, &logged);
        self.console.print(&format!(
            "{}\n{}",
            self.palette.bold(&format!(
                "Period {} to {}",
                format_iso_date(start),
                format_iso_date(end)
            )),
            display::period_table(&self.palette, &plan.days)
        ));

        let mut summary = RunSummary::default();
        if plan.unfilled.is_empty() {
            self.console.print(&display::all_days_filled(&self.palette));
            return Ok(self.finish(summary));
        }

        let count = plan.unfilled.len();
        for (index, day) in plan.unfilled.iter().enumerate() {
            self.console
                .print(&display::day_header(&self.palette, day, index + 1, count));
            tracing::info!(date = %format_iso_date(day.date), logged = day.logged_seconds, "interviewing day");

            match self.process_day(&issues, day, DayContext::for_day(day), Some(day.date)) {
                Ok(DayResult::Submitted(seconds)) => {
                    summary.committed_seconds = summary.committed_seconds.saturating_add(seconds);
                    summary.days_submitted += 1;
                }
                Ok(DayResult::Skipped) => {}
                Ok(DayResult::Stop) | Err(AppError::Interrupted) => {
                    summary.stopped_early = true;
                    break;
                }
                Err(error) => {
                    tracing::error!(%error, days_submitted = summary.days_submitted, "period run aborted");
                    return Err(error);
                }
            }
        }
        Ok(self.finish(summary))
    }

    /// Shows the user's own issues and returns every open issue, or `None`
    /// when there is nothing to log against.
    fn load_issues(&mut self) -> Result<Option<Vec<Issue>>, AppError> {
        let assigned = self.tracker.assigned_issues()?;
        if !assigned.is_empty() {
            self.console.print(&display::issues_table(
                &self.palette,
                "Your open issues",
                &assigned,
            ));
        }

        let open = self.tracker.open_issues()?;
        if open.is_empty() {
            self.console.print(&display::no_open_issues(&self.palette));
            return Ok(None);
        }
        tracing::debug!(assigned = assigned.len(), open = open.len(), "issues loaded");
        Ok(Some(open))
    }

    fn process_day(
        &mut self,
        issues: &[Issue],
        day: &DayStatus,
        context: DayContext,
        started: Option<Date>,
    ) -> Result<DayResult, AppError> {
        let outcome = {
            let mut interview = Interview::new(self.backend, &mut *self.console, self.cancel.clone())
                .with_palette(self.palette)
                .with_policy(self.policy)
                .with_sleeper(self.sleeper.as_ref());
            interview.run(issues, &context)?
        };

        match outcome {
            InterviewOutcome::Extracted(logs) => {
                let report = confirm_and_submit(
                    &mut *self.console,
                    self.tracker,
                    &self.palette,
                    &logs,
                    started,
                    Some(day.logged_seconds),
                    &self.cancel,
                )?;
                Ok(match report {
                    Some(report) => DayResult::Submitted(report.committed_seconds()),
                    None => DayResult::Skipped,
                })
            }
            InterviewOutcome::Abandoned => {
                self.console.print(&display::abandoned(&self.palette));
                Ok(DayResult::Skipped)
            }
            InterviewOutcome::Cancelled => Ok(DayResult::Stop),
        }
    }

    fn finish(&mut self, summary: RunSummary) -> RunSummary {
        if summary.stopped_early {
            self.console.print(&display::cancelled(&self.palette));
        }
        self.console
            .print(&display::farewell(&self.palette, summary.committed_seconds));
        summary
    }
}

/// Fills in whichever period bounds were not given on the command line.
///
/// Prompted dates are re-asked until valid; an end before the start is rejected.
pub fn resolve_period(
    console: &mut dyn Console,
    from: Option<Date>,
    to: Option<Date>,
    cancel: &CancelSignal,
) -> Result<(Date, Date), AppError> {
    let start = match from {
        Some(date) => date,
        None => ask_date(console, "Start date (YYYY-MM-DD): ", None, cancel)?,
    };
    let end = match to {
        Some(date) => date,
        None => ask_date(console, "End date (YYYY-MM-DD): ", Some(start), cancel)?,
    };

    if end < start {
        return Err(AppError::InvalidInput(format!(
            "end date {} is before start date {}",
            format_iso_date(end),
            format_iso_date(start)
        )));
    }
    Ok((start, end))
}

fn ask_date(
    console: &mut dyn Console,
    prompt: &str,
    not_before: Option<Date>,
    cancel: &CancelSignal,
) -> Result<Date, AppError> {
    loop {
        let Some(line) = console.read_line(prompt, cancel)? else {
            return Err(AppError::Interrupted);
        };
        match parse_iso_date(line.trim()) {
            Some(date) if not_before.is_some_and(|start| date < start) => {
                console.print("The end date cannot be before the start date.");
            }
            Some(date) => return Ok(date),
            None => console.print("Please enter a date like 2024-03-15."),
        }
    }
}
