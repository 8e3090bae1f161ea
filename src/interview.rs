//! One day's dialogue with the assistant, from greeting to a confirmed payload.
//!
//! The driver owns the [`ChatSession`] for the duration of [`Interview::run`];
//! nothing survives into the next day's interview. Only backend exchanges
//! count toward the turn budget. Empty lines and slash commands are handled
//! locally and re-prompt.

use assistant_provider::{BackendError, CancelSignal, ChatBackend, ChatSession};
use jira_api::Issue;
use thiserror::Error;

use crate::commands::{parse_slash_command, SlashCommand, CONFIG_HINT, HELP_TEXT};
use crate::console::{is_exit_phrase, Console, ConsoleError};
use crate::display::{self, Palette};
use crate::extract::extract_work_logs;
use crate::model::ParsedWorkLog;
use crate::prompt::{system_instructions, DayContext, OPENING_MESSAGE, SUMMARY_REQUEST};
use crate::retry::{call_with_retry, PollingSleeper, RetryPolicy, Sleeper};

/// Exchanges allowed before the driver forces a summary.
pub const MAX_TURNS: usize = 20;

const USER_PROMPT: &str = "you › ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewState {
    Started,
    Responding,
    AwaitingUser,
    Extracted,
    Abandoned,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewOutcome {
    /// The user confirmed these entries.
    Extracted(Vec<ParsedWorkLog>),
    /// The turn budget ran out without a confirmed payload.
    Abandoned,
    /// The user left with an exit phrase, `/exit` or end of input.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum InterviewError {
    /// The process interrupt fired during a send, a retry wait or a read.
    #[error("interview interrupted")]
    Interrupted,
    #[error("assistant request failed: {0}")]
    Backend(BackendError),
    #[error(transparent)]
    Console(ConsoleError),
}

impl From<BackendError> for InterviewError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Cancelled => Self::Interrupted,
            other => Self::Backend(other),
        }
    }
}

impl From<ConsoleError> for InterviewError {
    fn from(error: ConsoleError) -> Self {
        match error {
            ConsoleError::Interrupted => Self::Interrupted,
            other => Self::Console(other),
        }
    }
}

enum UserTurn {
    Message(String),
    Leave,
}

pub struct Interview<'a> {
    backend: &'a dyn ChatBackend,
    console: &'a mut dyn Console,
    cancel: CancelSignal,
    sleeper: Box<dyn Sleeper + 'a>,
    policy: RetryPolicy,
    palette: Palette,
    max_turns: usize,
    state: InterviewState,
    turns: usize,
}

impl<'a> Interview<'a> {
    pub fn new(
        backend: &'a dyn ChatBackend,
        console: &'a mut dyn Console,
        cancel: CancelSignal,
    ) -> Self {
        Self {
            backend,
            console,
            cancel,
            sleeper: Box::new(PollingSleeper::default()),
            policy: RetryPolicy::default(),
            palette: Palette::plain(),
            max_turns: MAX_TURNS,
            state: InterviewState::Started,
            turns: 0,
        }
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'a) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    #[must_use]
    pub fn state(&self) -> InterviewState {
        self.state
    }

    /// Backend exchanges made so far, the opening greeting and the forced
    /// summary request excluded.
    #[must_use]
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Runs the dialogue for one day.
    pub fn run(
        &mut self,
        issues: &[Issue],
        day: &DayContext,
    ) -> Result<InterviewOutcome, InterviewError> {
        self.state = InterviewState::Started;
        self.turns = 0;
        let mut session = ChatSession::new(system_instructions(issues, day));

        let mut last = self.exchange(&mut session, OPENING_MESSAGE)?;
        while self.turns < self.max_turns {
            if let Some(logs) = extract_work_logs(&last) {
                return Ok(self.finish(InterviewOutcome::Extracted(logs)));
            }

            self.state = InterviewState::AwaitingUser;
            let reply = display::assistant_reply(&self.palette, &last);
            self.console.print(&reply);

            let message = match self.next_user_turn()? {
                UserTurn::Message(message) => message,
                UserTurn::Leave => return Ok(self.finish(InterviewOutcome::Cancelled)),
            };
            last = self.exchange(&mut session, &message)?;
            self.turns += 1;
        }

        if let Some(logs) = extract_work_logs(&last) {
            return Ok(self.finish(InterviewOutcome::Extracted(logs)));
        }
        self.console.print(&display::assistant_reply(&self.palette, &last));

        tracing::info!(turns = self.turns, "turn budget exhausted, requesting summary");
        let summary = match self.exchange(&mut session, SUMMARY_REQUEST) {
            Ok(summary) => summary,
            Err(InterviewError::Backend(error)) => {
                tracing::warn!(%error, "summary request failed");
                return Ok(self.finish(InterviewOutcome::Abandoned));
            }
            Err(error) => return Err(error),
        };

        match extract_work_logs(&summary) {
            Some(logs) => Ok(self.finish(InterviewOutcome::Extracted(logs))),
            None => {
                self.console.print(&display::assistant_reply(&self.palette, &summary));
                Ok(self.finish(InterviewOutcome::Abandoned))
            }
        }
    }

    fn finish(&mut self, outcome: InterviewOutcome) -> InterviewOutcome {
        self.state = match outcome {
            InterviewOutcome::Extracted(_) => InterviewState::Extracted,
            InterviewOutcome::Abandoned => InterviewState::Abandoned,
            InterviewOutcome::Cancelled => InterviewState::Cancelled,
        };
        outcome
    }

    /// Sends one message through the retry policy and records the exchange.
    fn exchange(
        &mut self,
        session: &mut ChatSession,
        message: &str,
    ) -> Result<String, InterviewError> {
        self.state = InterviewState::Responding;

        let backend = self.backend;
        let console = &mut *self.console;
        let palette = self.palette;
        let cancel = &self.cancel;
        let mut on_retry = |error: &BackendError, wait: std::time::Duration| {
            console.print(&display::retry_notice(
                &palette,
                &error.to_string(),
                wait.as_secs(),
            ));
        };

        let reply = call_with_retry(
            &self.policy,
            self.sleeper.as_ref(),
            cancel,
            &mut on_retry,
            || backend.send(session, message, cancel),
        )?;

        session.record_exchange(message, reply.clone());
        Ok(reply)
    }

    fn next_user_turn(&mut self) -> Result<UserTurn, InterviewError> {
        loop {
            let Some(line) = self.console.read_line(USER_PROMPT, &self.cancel)? else {
                return Ok(UserTurn::Leave);
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if is_exit_phrase(input) {
                return Ok(UserTurn::Leave);
            }

            match parse_slash_command(input) {
                None => return Ok(UserTurn::Message(input.to_string())),
                Some(SlashCommand::Exit) => return Ok(UserTurn::Leave),
                Some(command) => self.run_command(command),
            }
        }
    }

    fn run_command(&mut self, command: SlashCommand) {
        match command {
            SlashCommand::Help => self.console.print(HELP_TEXT),
            SlashCommand::Model(None) => {
                let profile = self.backend.profile();
                self.console.print(&format!(
                    "Model: {} ({})",
                    profile.model_id, profile.provider_id
                ));
            }
            SlashCommand::Model(Some(model_id)) => match self.backend.set_model(&model_id) {
                Ok(profile) => {
                    tracing::info!(model = %profile.model_id, "model switched");
                    self.console
                        .print(&format!("Switched model to {}", profile.model_id));
                }
                Err(error) => self
                    .console
                    .print(&display::error_line(&self.palette, &error)),
            },
            SlashCommand::Clear => self.console.clear(),
            SlashCommand::Config => self.console.print(CONFIG_HINT),
            SlashCommand::Unknown(name) => self.console.print(&format!(
                "Unknown command {name}. Type /help for the list."
            )),
            SlashCommand::Exit => {}
        }
    }
}
