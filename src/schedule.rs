//! Day reconciliation: which weekdays in a range still need time logged.

use std::collections::BTreeMap;

use time::{Date, Weekday};

use crate::duration::HOUR;

/// A full working day.
pub const WORKDAY_SECONDS: u64 = 8 * HOUR;

/// Accounting snapshot for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStatus {
    pub date: Date,
    pub weekday: Weekday,
    pub logged_seconds: u64,
    pub filled: bool,
}

impl DayStatus {
    #[must_use]
    pub fn new(date: Date, logged_seconds: u64) -> Self {
        Self {
            date,
            weekday: date.weekday(),
            logged_seconds,
            filled: logged_seconds >= WORKDAY_SECONDS,
        }
    }

    /// Time still missing toward a full day, clamped at zero.
    #[must_use]
    pub fn remaining_seconds(&self) -> u64 {
        WORKDAY_SECONDS.saturating_sub(self.logged_seconds)
    }

    #[must_use]
    pub fn weekday_label(&self) -> String {
        self.weekday.to_string()
    }
}

/// Every weekday of a range plus the subset that still needs attention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodPlan {
    pub days: Vec<DayStatus>,
    pub unfilled: Vec<DayStatus>,
}

/// Builds the chronological plan for `[start, end]`, skipping Saturdays and Sundays.
///
/// Days missing from `logged` count as nothing logged. An inverted range is empty.
#[must_use]
pub fn plan_period(start: Date, end: Date, logged: &BTreeMap<Date, u64>) -> PeriodPlan {
    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        if !is_weekend(day) {
            days.push(DayStatus::new(day, logged.get(&day).copied().unwrap_or(0)));
        }
        match day.next_day() {
            Some(next) => day = next,
            None => break,
        }
    }

    let unfilled = days.iter().filter(|day| !day.filled).cloned().collect();
    PeriodPlan { days, unfilled }
}

/// The single-day shortcut: today with its already-logged seconds.
#[must_use]
pub fn plan_today(today: Date, logged_seconds: u64) -> DayStatus {
    DayStatus::new(today, logged_seconds)
}

#[must_use]
pub fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use time::Month;

    use super::*;

    fn date(month: Month, day: u8) -> Date {
        Date::from_calendar_date(2026, month, day).expect("valid date")
    }

    #[test]
    fn full_week_excludes_weekend_days() {
        // 2026-03-02 is a Monday.
        let plan = plan_period(date(Month::March, 2), date(Month::March, 8), &BTreeMap::new());

        let weekdays: Vec<Weekday> = plan.unfilled.iter().map(|day| day.weekday).collect();
        assert_eq!(
            weekdays,
            vec![
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
            ]
        );
        assert_eq!(plan.days.len(), 5);
    }

    #[test]
    fn filled_days_are_listed_but_never_unfilled() {
        let logged = BTreeMap::from([
            (date(Month::March, 3), WORKDAY_SECONDS),
            (date(Month::March, 4), WORKDAY_SECONDS + 1800),
            (date(Month::March, 5), WORKDAY_SECONDS - 1),
        ]);

        let plan = plan_period(date(Month::March, 2), date(Month::March, 6), &logged);
        let unfilled: Vec<Date> = plan.unfilled.iter().map(|day| day.date).collect();

        assert_eq!(plan.days.len(), 5);
        assert_eq!(
            unfilled,
            vec![
                date(Month::March, 2),
                date(Month::March, 5),
                date(Month::March, 6)
            ]
        );
        assert!(plan.days[1].filled);
    }

    #[test]
    fn unlogged_day_in_range_is_always_unfilled() {
        let plan = plan_period(date(Month::March, 4), date(Month::March, 4), &BTreeMap::new());
        assert_eq!(plan.unfilled, vec![DayStatus::new(date(Month::March, 4), 0)]);
    }

    #[test]
    fn range_crossing_month_end_stays_chronological() {
        let plan = plan_period(date(Month::February, 27), date(Month::March, 3), &BTreeMap::new());
        let dates: Vec<Date> = plan.days.iter().map(|day| day.date).collect();
        assert_eq!(
            dates,
            vec![
                date(Month::February, 27),
                date(Month::March, 2),
                date(Month::March, 3)
            ]
        );
    }

    #[test]
    fn inverted_or_weekend_only_ranges_are_empty() {
        assert_eq!(
            plan_period(date(Month::March, 6), date(Month::March, 2), &BTreeMap::new()),
            PeriodPlan::default()
        );
        assert!(plan_period(date(Month::March, 7), date(Month::March, 8), &BTreeMap::new())
            .days
            .is_empty());
    }

    #[test]
    fn today_shortcut_reports_remaining_time() {
        let today = plan_today(date(Month::March, 2), 3 * HOUR);
        assert!(!today.filled);
        assert_eq!(today.remaining_seconds(), 5 * HOUR);
        assert_eq!(today.weekday_label(), "Monday");

        let overfilled = plan_today(date(Month::March, 2), 9 * HOUR);
        assert!(overfilled.filled);
        assert_eq!(overfilled.remaining_seconds(), 0);
    }
}
