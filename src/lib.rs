//! Debate Clock - countdown timers for a structured debate
//!
//! The [`timer`] module holds the countdown primitive. The rest of the crate
//! is a board of three clocks (two prep timers and a main speech timer)
//! served over HTTP.

pub mod api;
pub mod config;
pub mod state;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::{AppState, BoardConfig, TimerId};
pub use timer::{DisplaySink, Timer, TimerError};
pub use utils::signals::shutdown_signal;
