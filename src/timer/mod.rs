//! Countdown timer core
//!
//! A [`Timer`] counts down once per second on the tokio runtime and reports
//! every change to a display sink and optional observers.

pub mod countdown;
pub mod error;
pub mod format;

pub use countdown::{DisplaySink, EndCallback, Timer, TimerBuilder, TimerPhase, TimerView, UpdateCallback, TICK_PERIOD};
pub use error::{checked_seconds, TimerError};
pub use format::format_clock;
