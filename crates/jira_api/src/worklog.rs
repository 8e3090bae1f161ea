//! Pure worklog arithmetic: date formats and per-day aggregation.

use std::collections::BTreeMap;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

use crate::types::WorklogEntry;

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// `YYYY-MM-DD`.
#[must_use]
pub fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// Parses a strict `YYYY-MM-DD` date.
#[must_use]
pub fn parse_iso_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), ISO_DATE).ok()
}

/// Worklog start for an explicit target day: 09:00 UTC, in the tracker's format.
#[must_use]
pub fn format_started(date: Date) -> String {
    format!("{}T09:00:00.000+0000", format_iso_date(date))
}

/// The calendar date of a worklog's `started` value, read in the entry's own offset.
#[must_use]
pub fn started_date(started: &str) -> Option<Date> {
    started.get(0..10).and_then(parse_iso_date)
}

/// Sums `time_spent_seconds` per day for entries authored by `identity`
/// whose start date falls inside `[start, end]`.
///
/// Every day in range gets an entry, so callers can tell "nothing logged"
/// apart from "not looked up".
#[must_use]
pub fn logged_seconds_by_day<'a>(
    entries: impl IntoIterator<Item = &'a WorklogEntry>,
    identity: &str,
    start: Date,
    end: Date,
) -> BTreeMap<Date, u64> {
    let mut totals = BTreeMap::new();
    let mut day = start;
    while day <= end {
        totals.insert(day, 0u64);
        match day.next_day() {
            Some(next) => day = next,
            None => break,
        }
    }

    for entry in entries {
        if !entry.author.matches(identity) {
            continue;
        }
        let Some(day) = started_date(&entry.started) else {
            continue;
        };
        if let Some(total) = totals.get_mut(&day) {
            *total = total.saturating_add(entry.time_spent_seconds);
        }
    }

    totals
}
