//! Notifications published by the board

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::timer::DisplaySink;
use super::TimerId;

/// Event delivered to board subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BoardEvent {
    /// A clock face changed
    Update {
        timer: TimerId,
        display: String,
        remaining_seconds: u64,
        initial_seconds: u64,
        at: DateTime<Utc>,
    },
    /// The main timer ran out; front ends flash the screen
    Flash { timer: TimerId, at: DateTime<Utc> },
}

impl BoardEvent {
    pub fn flash(timer: TimerId) -> Self {
        BoardEvent::Flash { timer, at: Utc::now() }
    }

    /// Event name used on the server-sent event stream
    pub fn kind(&self) -> &'static str {
        match self {
            BoardEvent::Update { .. } => "update",
            BoardEvent::Flash { .. } => "flash",
        }
    }
}

/// Display sink that publishes every clock face as a [`BoardEvent::Update`]
pub struct EventSink {
    id: TimerId,
    events: broadcast::Sender<BoardEvent>,
}

impl EventSink {
    pub fn new(id: TimerId, events: broadcast::Sender<BoardEvent>) -> Self {
        Self { id, events }
    }
}

impl DisplaySink for EventSink {
    fn show(&self, text: &str, remaining: u64, initial: u64) {
        let event = BoardEvent::Update {
            timer: self.id,
            display: text.to_string(),
            remaining_seconds: remaining,
            initial_seconds: initial,
            at: Utc::now(),
        };
        // Sending only fails when nobody is listening.
        if self.events.send(event).is_err() {
            trace!(timer = %self.id, "no event subscribers");
        }
    }
}
