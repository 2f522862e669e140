//! Error types for timer construction and duration input

use thiserror::Error;

/// Errors raised when a timer cannot be built or a duration is rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("invalid countdown duration {0}s: durations must not be negative")]
    InvalidDuration(i64),

    #[error("timers must be created inside a tokio runtime")]
    NoRuntime,
}

/// Convert raw signed input into a countdown length in whole seconds
pub fn checked_seconds(raw: i64) -> Result<u64, TimerError> {
    u64::try_from(raw).map_err(|_| TimerError::InvalidDuration(raw))
}
