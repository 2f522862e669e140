//! Board state module
//!
//! This module owns the three debate clocks and everything derived from them:
//! snapshots, button faces, the progress ring and published events.

pub mod app_state;
pub mod error;
pub mod events;
pub mod ring;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, BoardConfig};
pub use error::BoardError;
pub use events::{BoardEvent, EventSink};
pub use ring::{HashMark, ProgressRing, RingStatus};
pub use timer_state::{ButtonFace, ControlIcon, ControlLabel, TimerId, TimerSnapshot};
