//! Conversational time logging.
//!
//! `sj` interviews the user about the work they did, turns the conversation
//! into structured work-log entries and commits them to the issue tracker
//! after reconciling against what is already logged.
//!
//! The pieces, leaves first:
//! - [`duration`] parses informal durations such as `2h 30m` or `1.5ч`.
//! - [`extract`] recovers the confirmed payload from an assistant reply.
//! - [`schedule`] decides which weekdays still need time logged.
//! - [`interview`] drives one day's bounded dialogue under [`retry`].
//! - [`submit`] commits confirmed entries one by one.
//! - [`runner`] ties them together for today and period runs.

pub mod commands;
pub mod config;
pub mod console;
pub mod display;
pub mod duration;
pub mod error;
pub mod extract;
pub mod interview;
pub mod logging;
pub mod model;
pub mod platform;
pub mod prompt;
pub mod providers;
pub mod retry;
pub mod runner;
pub mod schedule;
pub mod setup;
pub mod submit;
pub mod tracker;

pub use error::AppError;
pub use model::ParsedWorkLog;
