//! Line-oriented terminal I/O behind a trait so the interview can be scripted.

use std::io::{self, Write};

use assistant_provider::CancelSignal;
use thiserror::Error;

use crate::platform::{LineRead, StdinReader};

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("input was interrupted")]
    Interrupted,
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// What the interview and runner need from a terminal.
pub trait Console {
    /// Writes one block of text followed by a newline.
    fn print(&mut self, text: &str);

    /// Shows `prompt` and reads one line.
    ///
    /// `Ok(None)` means end of input. A raised `cancel` yields
    /// [`ConsoleError::Interrupted`].
    fn read_line(
        &mut self,
        prompt: &str,
        cancel: &CancelSignal,
    ) -> Result<Option<String>, ConsoleError>;

    fn clear(&mut self);
}

/// Console over the process stdin/stdout.
#[derive(Debug, Default)]
pub struct TerminalConsole {
    reader: StdinReader,
}

impl TerminalConsole {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Console for TerminalConsole {
    fn print(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{text}");
        let _ = stdout.flush();
    }

    fn read_line(
        &mut self,
        prompt: &str,
        cancel: &CancelSignal,
    ) -> Result<Option<String>, ConsoleError> {
        {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
        }

        match self.reader.read_line(cancel)? {
            LineRead::Line(line) => Ok(Some(line)),
            LineRead::Eof => {
                // Keep the next output off the prompt line.
                self.print("");
                Ok(None)
            }
            LineRead::Interrupted => {
                self.print("");
                Err(ConsoleError::Interrupted)
            }
        }
    }

    fn clear(&mut self) {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\x1b[2J\x1b[H");
        let _ = stdout.flush();
    }
}

const EXIT_PHRASES: [&str; 4] = ["exit", "quit", "выход", "стоп"];

/// True when the user asked to leave the interview.
#[must_use]
pub fn is_exit_phrase(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    EXIT_PHRASES.contains(&normalized.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    No,
}

fn parse_answer(input: &str) -> Option<Answer> {
    match input.trim().to_lowercase().as_str() {
        "" | "y" | "yes" | "д" | "да" => Some(Answer::Yes),
        "n" | "no" | "н" | "нет" => Some(Answer::No),
        _ => None,
    }
}

/// Asks a `[Y/n]` question until the answer is recognized. End of input declines.
pub fn confirm(
    console: &mut dyn Console,
    question: &str,
    cancel: &CancelSignal,
) -> Result<bool, ConsoleError> {
    let prompt = format!("{question} [Y/n]: ");
    loop {
        let Some(line) = console.read_line(&prompt, cancel)? else {
            return Ok(false);
        };
        match parse_answer(&line) {
            Some(Answer::Yes) => return Ok(true),
            Some(Answer::No) => return Ok(false),
            None => console.print("Please answer y or n."),
        }
    }
}
