use std::io;

use assistant_provider::BackendError;
use config_store::ConfigStoreError;
use thiserror::Error;

use crate::console::ConsoleError;
use crate::interview::InterviewError;
use crate::tracker::TrackerError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigStoreError),
    #[error("tracker request failed: {0}")]
    Tracker(#[from] TrackerError),
    #[error("{0}")]
    Provider(String),
    #[error("assistant request failed: {0}")]
    Backend(BackendError),
    #[error(transparent)]
    Console(ConsoleError),
    #[error("failed to install the interrupt handler: {0}")]
    Signal(#[source] io::Error),
    #[error("{0}")]
    InvalidInput(String),
    #[error("setup was not completed")]
    SetupAborted,
    #[error("interrupted")]
    Interrupted,
}

impl AppError {
    /// User-initiated stops exit cleanly; everything else is a failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted | Self::SetupAborted => 0,
            _ => 1,
        }
    }

    #[must_use]
    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::Interrupted | Self::SetupAborted)
    }
}

impl From<ConsoleError> for AppError {
    fn from(error: ConsoleError) -> Self {
        match error {
            ConsoleError::Interrupted => Self::Interrupted,
            other => Self::Console(other),
        }
    }
}

impl From<InterviewError> for AppError {
    fn from(error: InterviewError) -> Self {
        match error {
            InterviewError::Interrupted => Self::Interrupted,
            InterviewError::Backend(error) => Self::Backend(error),
            InterviewError::Console(error) => Self::Console(error),
        }
    }
}
