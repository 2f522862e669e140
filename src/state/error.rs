//! Error types for board operations

use thiserror::Error;

use crate::timer::TimerError;

/// Errors returned when a board control is rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("no preset of {0} seconds is configured")]
    UnknownPreset(i64),
}
