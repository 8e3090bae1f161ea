//! System instructions and fixed messages sent to the assistant.

use std::fmt::Write as _;

use jira_api::{format_iso_date, Issue};
use time::Date;

use crate::duration::format_duration;
use crate::schedule::{DayStatus, WORKDAY_SECONDS};

/// First user turn of every session.
pub const OPENING_MESSAGE: &str = "Hi! I'm ready to start.";

/// Sent once when the turn budget runs out without a confirmed payload.
pub const SUMMARY_REQUEST: &str =
    "Please summarize everything we collected and return it in the JSON format now.";

/// What the assistant is told about the day it interviews for.
#[derive(Debug, Clone, Copy)]
pub struct DayContext {
    pub logged_seconds: u64,
    /// Present in period mode only; today mode talks about "today".
    pub date: Option<Date>,
}

impl DayContext {
    #[must_use]
    pub fn today(logged_seconds: u64) -> Self {
        Self {
            logged_seconds,
            date: None,
        }
    }

    #[must_use]
    pub fn for_day(day: &DayStatus) -> Self {
        Self {
            logged_seconds: day.logged_seconds,
            date: Some(day.date),
        }
    }

    fn remaining_seconds(&self) -> u64 {
        WORKDAY_SECONDS.saturating_sub(self.logged_seconds)
    }
}

/// Builds the per-day system instructions.
#[must_use]
pub fn system_instructions(issues: &[Issue], day: &DayContext) -> String {
    let (day_label, narration) = match day.date {
        Some(date) => {
            let date = format_iso_date(date);
            (format!("for {date}"), format!("what they worked on on {date}"))
        }
        None => ("for today".to_string(), "what they worked on today".to_string()),
    };

    let mut issue_list = String::new();
    for issue in issues {
        let _ = writeln!(issue_list, "- {}: {}", issue.key, issue.summary);
    }

    let time_info = if day.logged_seconds > 0 {
        format!(
            "ALREADY LOGGED {}: {}\nSTILL TO LOG: {} (a working day is 8h)\n",
            day_label.to_uppercase(),
            format_duration(day.logged_seconds),
            format_duration(day.remaining_seconds()),
        )
    } else {
        format!(
            "NOTHING IS LOGGED {} YET. A working day is 8h.\n",
            day_label.to_uppercase()
        )
    };

    format!(
        "You are a friendly assistant that helps the user log working time in Jira.\n\n\
         Your job is to help the user log their working time {day_label}.\n\
         \n{time_info}\n\
         USER'S ISSUES:\n{issue_list}\n\
         DIALOGUE FLOW (strictly step by step):\n\n\
         STEP 1 - What did you do?\n\
         - Greet the user and ask them to freely describe {narration}.\n\
         - Do NOT ask about each issue separately.\n\
         - The user describes activities in their own words.\n\n\
         STEP 2 - Mapping to issues\n\
         - Based on the story, propose which issue from the list each activity belongs to.\n\
         - If the user explicitly names an issue key that is not in the list (for example PROJ-456), accept it as is.\n\
         - If something is unclear, ask.\n\
         - Wait for the user to confirm the mapping.\n\n\
         STEP 3 - How much time?\n\
         - Ask how much time the user spent on each issue.\n\
         - Time format: 2h, 30m, 2h 30m, 1.5h.\n\
         - Take the already logged time into account: the day should add up to exactly 8h.\n\
         - If new time plus already logged time is not 8h, point it out to the user.\n\n\
         STEP 4 - Summary\n\
         - Show the final summary as a list:\n\
         \x20 Issue | Time | What was done\n\
         - Ask for confirmation.\n\
         - After confirmation return JSON.\n\n\
         IMPORTANT:\n\
         - Talk naturally, like a real person\n\
         - Avoid a formal tone\n\
         - Be positive and supportive\n\
         - Reply in the language the user writes in\n\
         - Once the user has confirmed the summary, return JSON in this format:\n\
         ```json\n\
         {{\n\
         \x20 \"work_logs\": [\n\
         \x20   {{\n\
         \x20     \"issue_key\": \"PROJ-123\",\n\
         \x20     \"time_spent\": \"2h 30m\",\n\
         \x20     \"description\": \"What was done\"\n\
         \x20   }}\n\
         \x20 ],\n\
         \x20 \"ready_to_submit\": true\n\
         }}\n\
         ```\n\
         Start the dialogue!"
    )
}
