//! JQL filters used by the time logging flow.

use time::Date;

use crate::worklog::format_iso_date;

/// Open, loggable issues assigned to the current user.
pub const ASSIGNED_OPEN_ISSUES: &str = "assignee = currentUser() AND status != \"Done\" \
     AND issuetype not in (Story, Epic) ORDER BY updated DESC";

/// Every open, loggable issue visible to the current user.
pub const ALL_OPEN_ISSUES: &str =
    "status != \"Done\" AND issuetype not in (Story, Epic) ORDER BY updated DESC";

/// Issues carrying a worklog by the current user inside `[start, end]`.
#[must_use]
pub fn worklogs_in_range(start: Date, end: Date) -> String {
    format!(
        "worklogDate >= \"{}\" AND worklogDate <= \"{}\" AND worklogAuthor = currentUser()",
        format_iso_date(start),
        format_iso_date(end)
    )
}

#[cfg(test)]
mod tests {
    use time::{Date, Month};

    use super::worklogs_in_range;

    #[test]
    fn range_filter_is_inclusive_and_author_scoped() {
        let start = Date::from_calendar_date(2026, Month::March, 2).expect("valid date");
        let end = Date::from_calendar_date(2026, Month::March, 6).expect("valid date");

        assert_eq!(
            worklogs_in_range(start, end),
            "worklogDate >= \"2026-03-02\" AND worklogDate <= \"2026-03-06\" AND worklogAuthor = currentUser()"
        );
    }
}
