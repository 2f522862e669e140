//! Debate board state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::timer::{checked_seconds, Timer, TimerError};
use super::{BoardError, BoardEvent, EventSink, ProgressRing, RingStatus, TimerId, TimerSnapshot};

/// Durations the board is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Prep time for each side, in seconds
    pub prep_seconds: u64,
    /// Initial main speech length, in seconds
    pub main_seconds: u64,
    /// Speech lengths selectable for the main timer
    pub presets: Vec<u64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            prep_seconds: 180,
            main_seconds: 240,
            presets: vec![240, 300, 360, 480],
        }
    }
}

/// Main application state: the three clocks and the service metadata
#[derive(Debug)]
pub struct AppState {
    aff: Timer,
    neg: Timer,
    main: Timer,
    /// Speech lengths selectable for the main timer
    pub presets: Vec<u64>,
    active_preset: Mutex<Option<u64>>,
    /// Ring drawn around the main timer
    pub ring: ProgressRing,
    ring_rx: watch::Receiver<usize>,
    /// Channel for clock updates and flash events
    pub events_tx: broadcast::Sender<BoardEvent>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create the board. Must run inside the tokio runtime that will drive the clocks.
    pub fn new(port: u16, host: String, board: BoardConfig) -> Result<Self, TimerError> {
        let (events_tx, _) = broadcast::channel(100);
        let ring = ProgressRing::new();
        let (ring_tx, ring_rx) = watch::channel(0);

        let prep = |id: TimerId| {
            Timer::builder(Arc::new(EventSink::new(id, events_tx.clone())), board.prep_seconds)
                .label(id.as_str())
                .build()
        };
        let aff = prep(TimerId::Aff)?;
        let neg = prep(TimerId::Neg)?;

        let flash_tx = events_tx.clone();
        let main = Timer::builder(
            Arc::new(EventSink::new(TimerId::Main, events_tx.clone())),
            board.main_seconds,
        )
        .label(TimerId::Main.as_str())
        .on_update(move |remaining, initial| {
            if let Err(e) = ring_tx.send(ring.consumed_marks(remaining, initial)) {
                warn!("Failed to update progress ring: {}", e);
            }
        })
        .on_end(move || {
            info!("Main timer expired, flashing");
            if flash_tx.send(BoardEvent::flash(TimerId::Main)).is_err() {
                debug!("No subscribers to receive the flash");
            }
        })
        .build()?;

        let active_preset = board
            .presets
            .contains(&board.main_seconds)
            .then_some(board.main_seconds);

        Ok(Self {
            aff,
            neg,
            main,
            presets: board.presets,
            active_preset: Mutex::new(active_preset),
            ring,
            ring_rx,
            events_tx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        })
    }

    /// The clock behind `id`
    pub fn timer(&self, id: TimerId) -> &Timer {
        match id {
            TimerId::Aff => &self.aff,
            TimerId::Neg => &self.neg,
            TimerId::Main => &self.main,
        }
    }

    fn record_action(&self, id: TimerId, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(format!("{}-{}", id, action));
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Start a clock counting down
    pub fn start(&self, id: TimerId) -> TimerSnapshot {
        self.record_action(id, "start");
        self.timer(id).start();
        self.snapshot(id)
    }

    /// Pause a clock, keeping its remaining time
    pub fn pause(&self, id: TimerId) -> TimerSnapshot {
        self.record_action(id, "pause");
        self.timer(id).pause();
        self.snapshot(id)
    }

    /// Stop a clock and restore its full duration
    pub fn reset(&self, id: TimerId) -> TimerSnapshot {
        self.record_action(id, "reset");
        self.timer(id).reset();
        self.snapshot(id)
    }

    /// Single start/pause button: pause a running clock, otherwise start it
    /// unless nothing is left on it
    pub fn toggle(&self, id: TimerId) -> TimerSnapshot {
        self.record_action(id, "toggle");
        let timer = self.timer(id);
        let view = timer.view();
        if view.running {
            timer.pause();
        } else if view.remaining_seconds > 0 {
            timer.start();
        }
        self.snapshot(id)
    }

    /// Retarget a clock to a new full duration
    pub fn set_time(&self, id: TimerId, raw_seconds: i64) -> Result<TimerSnapshot, BoardError> {
        let seconds = checked_seconds(raw_seconds)?;
        self.record_action(id, "set-time");
        self.timer(id).set_time(seconds);

        if id.is_main() {
            let matching = self.presets.contains(&seconds).then_some(seconds);
            self.set_active_preset(matching);
        }
        Ok(self.snapshot(id))
    }

    /// Retarget the main timer to one of the configured speech lengths
    pub fn select_preset(&self, raw_seconds: i64) -> Result<TimerSnapshot, BoardError> {
        let seconds = checked_seconds(raw_seconds)?;
        if !self.presets.contains(&seconds) {
            return Err(BoardError::UnknownPreset(raw_seconds));
        }

        info!("Selecting main timer preset of {}s", seconds);
        self.record_action(TimerId::Main, "preset");
        self.main.set_time(seconds);
        self.set_active_preset(Some(seconds));
        Ok(self.snapshot(TimerId::Main))
    }

    fn set_active_preset(&self, preset: Option<u64>) {
        if let Ok(mut active) = self.active_preset.lock() {
            *active = preset;
        }
    }

    /// Preset the main timer was last set to, if any
    pub fn active_preset(&self) -> Option<u64> {
        self.active_preset.lock().ok().and_then(|active| *active)
    }

    /// Current state of one clock
    pub fn snapshot(&self, id: TimerId) -> TimerSnapshot {
        TimerSnapshot::capture(id, self.timer(id))
    }

    /// Current state of every clock, in board order
    pub fn snapshots(&self) -> Vec<TimerSnapshot> {
        TimerId::ALL.iter().map(|&id| self.snapshot(id)).collect()
    }

    /// Ring geometry and how many marks the main timer has used up
    pub fn ring_status(&self) -> RingStatus {
        RingStatus {
            ring: self.ring,
            consumed_marks: *self.ring_rx.borrow(),
            marks: self.ring.hash_marks(),
        }
    }

    /// Receive clock updates and flash events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
