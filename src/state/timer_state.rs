//! Timer identity and snapshot structures

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::timer::{Timer, TimerPhase, TimerView};

/// The three clocks on a debate board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerId {
    /// Affirmative prep time
    Aff,
    /// Negative prep time
    Neg,
    /// Main speech
    Main,
}

impl TimerId {
    pub const ALL: [TimerId; 3] = [TimerId::Aff, TimerId::Neg, TimerId::Main];

    /// Path segment and log name of the clock
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerId::Aff => "aff",
            TimerId::Neg => "neg",
            TimerId::Main => "main",
        }
    }

    /// Whether this is the main speech clock
    pub fn is_main(&self) -> bool {
        matches!(self, TimerId::Main)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text shown on the main timer's start/pause button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlLabel {
    Start,
    Pause,
    Resume,
}

/// Icon shown on a prep timer's start/pause button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlIcon {
    Play,
    Pause,
}

/// What the start/pause button of a clock should display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ButtonFace {
    Label(ControlLabel),
    Icon(ControlIcon),
}

impl ButtonFace {
    /// Main timer: `Pause` while running, `Resume` when stopped part-way,
    /// `Start` otherwise. Prep timers: a pause icon while running, play otherwise.
    pub fn for_timer(id: TimerId, view: &TimerView) -> Self {
        if !id.is_main() {
            return if view.running {
                ButtonFace::Icon(ControlIcon::Pause)
            } else {
                ButtonFace::Icon(ControlIcon::Play)
            };
        }

        let label = if view.running {
            ControlLabel::Pause
        } else if view.remaining_seconds > 0 && view.remaining_seconds < view.initial_seconds {
            ControlLabel::Resume
        } else {
            ControlLabel::Start
        };
        ButtonFace::Label(label)
    }
}

/// Point-in-time view of one clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub id: TimerId,
    pub display: String,
    pub remaining_seconds: u64,
    pub initial_seconds: u64,
    pub running: bool,
    pub phase: TimerPhase,
    pub button: ButtonFace,
}

impl TimerSnapshot {
    /// Capture the current state of `timer` in one consistent reading
    pub fn capture(id: TimerId, timer: &Timer) -> Self {
        Self::from_view(id, timer.view())
    }

    /// Build a snapshot from an already taken view
    pub fn from_view(id: TimerId, view: TimerView) -> Self {
        let button = ButtonFace::for_timer(id, &view);
        Self {
            id,
            display: view.display,
            remaining_seconds: view.remaining_seconds,
            initial_seconds: view.initial_seconds,
            running: view.running,
            phase: view.phase,
            button,
        }
    }
}
