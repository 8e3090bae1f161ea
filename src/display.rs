//! Plain-text screens for the interview: tables, summaries and status lines.
//!
//! Everything here returns strings; printing goes through [`crate::console::Console`].

use std::sync::OnceLock;

use assistant_provider::BackendProfile;
use jira_api::{format_iso_date, Issue};
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::duration::{format_duration, format_hours_minutes};
use crate::extract::strip_payload;
use crate::model::{total_seconds, ParsedWorkLog};
use crate::schedule::{DayStatus, WORKDAY_SECONDS};
use crate::submit::{EntryOutcome, SubmissionReport};

const SUMMARY_COLUMN_MAX: usize = 60;

/// ANSI styling that collapses to plain text when colors are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    #[must_use]
    pub fn plain() -> Self {
        Self::new(false)
    }

    fn wrap(&self, text: &str, prefix: &str, suffix: &str) -> String {
        if self.color {
            ansi_wrap(text, prefix, suffix)
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        self.wrap(text, "\x1b[1m", "\x1b[22m")
    }

    pub fn dim(&self, text: &str) -> String {
        self.wrap(text, "\x1b[2m", "\x1b[22m")
    }

    pub fn cyan(&self, text: &str) -> String {
        self.wrap(text, "\x1b[36m", "\x1b[39m")
    }

    pub fn green(&self, text: &str) -> String {
        self.wrap(text, "\x1b[32m", "\x1b[39m")
    }

    pub fn yellow(&self, text: &str) -> String {
        self.wrap(text, "\x1b[33m", "\x1b[39m")
    }

    pub fn red(&self, text: &str) -> String {
        self.wrap(text, "\x1b[31m", "\x1b[39m")
    }

    pub fn magenta(&self, text: &str) -> String {
        self.wrap(text, "\x1b[35m", "\x1b[39m")
    }
}

fn ansi_wrap(text: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{text}{suffix}")
}

fn ansi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ansi regex"))
}

/// Terminal columns taken by `text`, ignoring SGR escapes.
#[must_use]
pub fn visible_width(text: &str) -> usize {
    let clean = ansi_pattern().replace_all(text, "");
    clean
        .graphemes(true)
        .map(UnicodeWidthStr::width)
        .sum()
}

/// Cuts plain `text` to at most `max` columns, marking the cut with `…`.
fn truncate_to_width(text: &str, max: usize) -> String {
    if visible_width(text) <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for grapheme in text.graphemes(true) {
        let next = UnicodeWidthStr::width(grapheme);
        if width + next + 1 > max {
            break;
        }
        out.push_str(grapheme);
        width += next;
    }
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(visible_width(text));
    format!("{text}{}", " ".repeat(fill))
}

/// Boxed table; `header` and every row must have the same column count.
#[must_use]
pub fn render_table(palette: &Palette, header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|cell| visible_width(cell)).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(visible_width(cell));
            }
        }
    }

    let border = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        palette.dim(&format!("{left}{}{right}", segments.join(mid)))
    };
    let line = |cells: Vec<String>| {
        let bar = palette.dim("│");
        let body: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {} ", pad(cell, *width)))
            .collect();
        format!("{bar}{}{bar}", body.join(bar.as_str()))
    };

    let mut lines = vec![border("┌", "┬", "┐")];
    lines.push(line(header.iter().map(|cell| palette.bold(cell)).collect()));
    lines.push(border("├", "┼", "┤"));
    for row in rows {
        lines.push(line(row.clone()));
    }
    lines.push(border("└", "┴", "┘"));
    lines.join("\n")
}

struct MarkupPatterns {
    heading: Regex,
    bold: Regex,
    italic: Regex,
    code: Regex,
}

fn markup_patterns() -> &'static MarkupPatterns {
    static PATTERNS: OnceLock<MarkupPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| MarkupPatterns {
        heading: Regex::new(r"(?m)^#{1,6}\s+").expect("valid heading regex"),
        bold: Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").expect("valid bold regex"),
        italic: Regex::new(r"(^|[^*\w])\*([^*\n]+)\*").expect("valid italic regex"),
        code: Regex::new(r"`([^`\n]+)`").expect("valid code regex"),
    })
}

/// Drops lightweight markdown so replies read as plain terminal text.
#[must_use]
pub fn strip_markup(text: &str) -> String {
    let patterns = markup_patterns();
    let text = patterns.heading.replace_all(text, "");
    let text = patterns.bold.replace_all(&text, "$1$2");
    let text = patterns.italic.replace_all(&text, "$1$2");
    patterns.code.replace_all(&text, "$1").into_owned()
}

/// An assistant reply as the user should see it: no payload, no markup.
#[must_use]
pub fn assistant_reply(palette: &Palette, text: &str) -> String {
    let visible = strip_markup(strip_payload(text));
    format!("{} {}", palette.magenta("assistant ›"), visible.trim())
}

#[must_use]
pub fn welcome(palette: &Palette, profile: &BackendProfile) -> String {
    format!(
        "{}\n{}",
        palette.bold(&palette.cyan("Secretary: let's log your work.")),
        palette.dim(&format!(
            "{} · {} · type /help for commands, exit to leave",
            profile.provider_id, profile.model_id
        )),
    )
}

#[must_use]
pub fn issues_table(palette: &Palette, title: &str, issues: &[Issue]) -> String {
    let rows: Vec<Vec<String>> = issues
        .iter()
        .map(|issue| {
            vec![
                palette.cyan(&issue.key),
                truncate_to_width(&issue.summary, SUMMARY_COLUMN_MAX),
                issue.status.clone(),
            ]
        })
        .collect();
    format!(
        "{}\n{}",
        palette.bold(title),
        render_table(palette, &["Key", "Summary", "Status"], &rows)
    )
}

/// Already-logged time for today.
#[must_use]
pub fn today_status(palette: &Palette, day: &DayStatus) -> String {
    let logged = format_hours_minutes(day.logged_seconds);
    if day.filled {
        palette.green(&format!(
            "Today is already filled: {logged} of {} logged.",
            format_duration(WORKDAY_SECONDS)
        ))
    } else {
        format!(
            "Logged today: {logged}. Remaining: {}.",
            palette.yellow(&format_hours_minutes(day.remaining_seconds()))
        )
    }
}

#[must_use]
pub fn period_table(palette: &Palette, days: &[DayStatus]) -> String {
    let rows: Vec<Vec<String>> = days
        .iter()
        .map(|day| {
            let status = if day.filled {
                palette.green("filled")
            } else {
                palette.yellow(&format!(
                    "missing {}",
                    format_duration(day.remaining_seconds())
                ))
            };
            vec![
                format_iso_date(day.date),
                day.weekday_label(),
                format_hours_minutes(day.logged_seconds),
                status,
            ]
        })
        .collect();
    render_table(palette, &["Date", "Weekday", "Logged", "Status"], &rows)
}

#[must_use]
pub fn day_header(palette: &Palette, day: &DayStatus, position: usize, count: usize) -> String {
    palette.bold(&format!(
        "── Day {position}/{count}: {} ({}), logged {}, remaining {} ──",
        format_iso_date(day.date),
        day.weekday_label(),
        format_hours_minutes(day.logged_seconds),
        format_hours_minutes(day.remaining_seconds()),
    ))
}

/// Entries grouped by issue in first-appearance order, with totals.
#[must_use]
pub fn summary(palette: &Palette, logs: &[ParsedWorkLog], already_logged: Option<u64>) -> String {
    let mut groups: Vec<(&str, u64, Vec<&str>)> = Vec::new();
    for log in logs {
        match groups.iter_mut().find(|(key, _, _)| *key == log.issue_key) {
            Some((_, seconds, descriptions)) => {
                *seconds = seconds.saturating_add(log.seconds);
                descriptions.push(log.description.as_str());
            }
            None => groups.push((
                log.issue_key.as_str(),
                log.seconds,
                vec![log.description.as_str()],
            )),
        }
    }

    let mut lines = vec![palette.bold("Work to log:")];
    for (key, seconds, descriptions) in &groups {
        lines.push(format!(
            "  {} {}",
            palette.cyan(key),
            palette.bold(&format_duration(*seconds))
        ));
        for description in descriptions.iter().filter(|text| !text.trim().is_empty()) {
            lines.push(format!("    - {}", description.trim()));
        }
    }

    let total = total_seconds(logs);
    lines.push(format!("Total: {}", palette.bold(&format_duration(total))));
    if let Some(logged) = already_logged {
        lines.push(palette.dim(&format!(
            "Day total after submitting: {}",
            format_hours_minutes(logged.saturating_add(total))
        )));
    }
    lines.join("\n")
}

#[must_use]
pub fn entry_outcome(palette: &Palette, outcome: &EntryOutcome) -> String {
    let log = &outcome.log;
    match &outcome.error {
        None => format!(
            "{} {} {}",
            palette.green("✓"),
            log.issue_key,
            format_duration(log.seconds)
        ),
        Some(error) => format!(
            "{} {} {}: {}",
            palette.red("✗"),
            log.issue_key,
            format_duration(log.seconds),
            error
        ),
    }
}

#[must_use]
pub fn submission_result(palette: &Palette, report: &SubmissionReport) -> String {
    let failed = report.failed_count();
    let mut line = format!(
        "Logged {} across {} entr{}.",
        palette.bold(&format_duration(report.committed_seconds())),
        report.succeeded_count(),
        if report.succeeded_count() == 1 { "y" } else { "ies" }
    );
    if failed > 0 {
        line.push_str(&palette.red(&format!(" {failed} failed.")));
    }
    line
}

#[must_use]
pub fn farewell(palette: &Palette, committed_seconds: u64) -> String {
    if committed_seconds == 0 {
        palette.dim("Nothing was logged this time. Bye!")
    } else {
        palette.green(&format!(
            "Done: {} logged in total. Bye!",
            format_duration(committed_seconds)
        ))
    }
}

#[must_use]
pub fn no_open_issues(palette: &Palette) -> String {
    palette.yellow("No open issues found. Nothing to log against.")
}

#[must_use]
pub fn all_days_filled(palette: &Palette) -> String {
    palette.green("Every weekday in this period is already filled.")
}

#[must_use]
pub fn abandoned(palette: &Palette) -> String {
    palette.yellow("Could not collect a confirmed summary; nothing was submitted.")
}

#[must_use]
pub fn declined(palette: &Palette) -> String {
    palette.dim("Submission skipped.")
}

#[must_use]
pub fn cancelled(palette: &Palette) -> String {
    palette.dim("Interview cancelled.")
}

#[must_use]
pub fn retry_notice(palette: &Palette, reason: &str, wait_seconds: u64) -> String {
    palette.yellow(&format!(
        "Assistant is busy ({reason}); retrying in {wait_seconds}s…"
    ))
}

#[must_use]
pub fn error_line(palette: &Palette, message: &str) -> String {
    palette.red(&format!("Error: {message}"))
}
