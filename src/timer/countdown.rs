//! Countdown timer with cancellable one-second ticks

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};
use serde::{Deserialize, Serialize};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, trace};

use super::{error::TimerError, format::format_clock};

/// Interval between two ticks of a running timer
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Observer invoked with `(remaining, initial)` on every update
pub type UpdateCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Observer invoked once when a running countdown reaches zero
pub type EndCallback = Arc<dyn Fn() + Send + Sync>;

/// Receiver of the rendered clock face.
///
/// The sink is told about every update before the `on_update` observer. It
/// runs while the timer is locked and must not call back into the same timer.
pub trait DisplaySink: Send + Sync {
    fn show(&self, text: &str, remaining: u64, initial: u64);
}

impl<F> DisplaySink for F
where
    F: Fn(&str, u64, u64) + Send + Sync,
{
    fn show(&self, text: &str, remaining: u64, initial: u64) {
        self(text, remaining, initial)
    }
}

/// Observable phase of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Expired,
}

/// Consistent reading of a timer, taken under a single lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerView {
    pub remaining_seconds: u64,
    pub initial_seconds: u64,
    pub running: bool,
    pub phase: TimerPhase,
    /// Clock face, e.g. `2:59`
    pub display: String,
}

/// Live tick schedule. Dropping it cancels the task.
struct Ticker(JoinHandle<()>);

impl Drop for Ticker {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct Inner {
    label: String,
    initial_seconds: u64,
    remaining_seconds: u64,
    /// Bumped on every schedule start and stop; ticks from older schedules are ignored
    generation: u64,
    ticker: Option<Ticker>,
    display: Arc<dyn DisplaySink>,
    on_update: Option<UpdateCallback>,
    on_end: Option<EndCallback>,
}

impl Inner {
    fn notify(&self) {
        let text = format_clock(self.remaining_seconds);
        self.display.show(&text, self.remaining_seconds, self.initial_seconds);
        if let Some(on_update) = &self.on_update {
            on_update(self.remaining_seconds, self.initial_seconds);
        }
    }

    fn phase(&self) -> TimerPhase {
        if self.ticker.is_some() {
            TimerPhase::Running
        } else if self.remaining_seconds == 0 {
            TimerPhase::Expired
        } else {
            TimerPhase::Idle
        }
    }

    fn view(&self) -> TimerView {
        TimerView {
            remaining_seconds: self.remaining_seconds,
            initial_seconds: self.initial_seconds,
            running: self.ticker.is_some(),
            phase: self.phase(),
            display: format_clock(self.remaining_seconds),
        }
    }

    /// Release the tick schedule if one is held. Returns whether it was running.
    fn halt(&mut self) -> bool {
        match self.ticker.take() {
            Some(ticker) => {
                self.generation += 1;
                drop(ticker);
                true
            }
            None => false,
        }
    }

    /// Apply one tick. Returns false once the schedule should end.
    fn tick(&mut self) -> bool {
        if self.remaining_seconds == 0 {
            self.halt();
            return false;
        }

        self.remaining_seconds -= 1;
        trace!(timer = %self.label, remaining = self.remaining_seconds, "tick");
        self.notify();

        if self.remaining_seconds == 0 {
            self.halt();
            info!(timer = %self.label, "countdown of {}s finished", self.initial_seconds);
            if let Some(on_end) = &self.on_end {
                on_end();
            }
            return false;
        }

        true
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    // A panicking observer leaves the counters consistent, so keep going.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn tick_once(inner: &Weak<Mutex<Inner>>, generation: u64) -> bool {
    let Some(shared) = inner.upgrade() else {
        return false;
    };
    let mut state = lock(&shared);
    if state.generation != generation || state.ticker.is_none() {
        return false;
    }
    state.tick()
}

async fn tick_loop(inner: Weak<Mutex<Inner>>, generation: u64, first_tick: Instant) {
    let mut interval = time::interval_at(first_tick, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if !tick_once(&inner, generation) {
            break;
        }
    }
}

/// Builder for a [`Timer`] with optional observers
pub struct TimerBuilder {
    label: String,
    initial_seconds: u64,
    display: Arc<dyn DisplaySink>,
    on_update: Option<UpdateCallback>,
    on_end: Option<EndCallback>,
}

impl TimerBuilder {
    /// Name used for this timer in log output
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Observe every update with `(remaining, initial)`
    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(callback));
        self
    }

    /// Observe the countdown reaching zero
    pub fn on_end<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_end = Some(Arc::new(callback));
        self
    }

    /// Create the timer and render its initial state.
    ///
    /// Must be called from within a tokio runtime; the runtime handle is kept
    /// so `start` can be called from any thread afterwards.
    pub fn build(self) -> Result<Timer, TimerError> {
        let runtime = Handle::try_current().map_err(|_| TimerError::NoRuntime)?;

        let inner = Inner {
            label: self.label,
            initial_seconds: self.initial_seconds,
            remaining_seconds: self.initial_seconds,
            generation: 0,
            ticker: None,
            display: self.display,
            on_update: self.on_update,
            on_end: self.on_end,
        };
        debug!(timer = %inner.label, "created with {}s", inner.initial_seconds);
        inner.notify();

        Ok(Timer {
            inner: Arc::new(Mutex::new(inner)),
            runtime,
        })
    }
}

/// One independent countdown.
///
/// All operations return immediately. Observers are called while the timer is
/// locked, so they must not call back into the same timer.
pub struct Timer {
    inner: Arc<Mutex<Inner>>,
    runtime: Handle,
}

impl Timer {
    /// Start building a timer that renders to `display`
    pub fn builder(display: Arc<dyn DisplaySink>, initial_seconds: u64) -> TimerBuilder {
        TimerBuilder {
            label: "timer".to_string(),
            initial_seconds,
            display,
            on_update: None,
            on_end: None,
        }
    }

    /// Create a timer without observers
    pub fn new(display: Arc<dyn DisplaySink>, initial_seconds: u64) -> Result<Self, TimerError> {
        Self::builder(display, initial_seconds).build()
    }

    /// Begin counting down. Ignored while running or once at zero.
    pub fn start(&self) {
        let mut state = lock(&self.inner);
        if state.ticker.is_some() {
            trace!(timer = %state.label, "already running");
            return;
        }
        if state.remaining_seconds == 0 {
            debug!(timer = %state.label, "nothing left to count down, start ignored");
            return;
        }

        state.generation += 1;
        let first_tick = Instant::now() + TICK_PERIOD;
        let handle = self.runtime.spawn(tick_loop(
            Arc::downgrade(&self.inner),
            state.generation,
            first_tick,
        ));
        state.ticker = Some(Ticker(handle));
        debug!(timer = %state.label, remaining = state.remaining_seconds, "started");
    }

    /// Stop counting down, keeping the remaining time
    pub fn pause(&self) {
        let mut state = lock(&self.inner);
        if state.halt() {
            debug!(timer = %state.label, remaining = state.remaining_seconds, "paused");
        }
    }

    /// Stop and restore the full duration
    pub fn reset(&self) {
        let mut state = lock(&self.inner);
        state.halt();
        state.remaining_seconds = state.initial_seconds;
        debug!(timer = %state.label, "reset to {}s", state.initial_seconds);
        state.notify();
    }

    /// Stop and replace the full duration with `seconds`
    pub fn set_time(&self, seconds: u64) {
        let mut state = lock(&self.inner);
        state.halt();
        state.initial_seconds = seconds;
        state.remaining_seconds = seconds;
        debug!(timer = %state.label, "retargeted to {}s", seconds);
        state.notify();
    }

    /// Seconds left on the clock
    pub fn remaining_seconds(&self) -> u64 {
        lock(&self.inner).remaining_seconds
    }

    /// Full duration restored by `reset`
    pub fn initial_seconds(&self) -> u64 {
        lock(&self.inner).initial_seconds
    }

    /// Whether a tick schedule is active
    pub fn is_running(&self) -> bool {
        lock(&self.inner).ticker.is_some()
    }

    /// Idle, running or expired
    pub fn phase(&self) -> TimerPhase {
        lock(&self.inner).phase()
    }

    /// Every observable field at once, so no tick can fall between the reads
    pub fn view(&self) -> TimerView {
        lock(&self.inner).view()
    }

    /// Current clock face, e.g. `2:59`
    pub fn display_text(&self) -> String {
        format_clock(lock(&self.inner).remaining_seconds)
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let mut state = lock(&self.inner);
        if state.halt() {
            debug!(timer = %state.label, "dropped while running, ticks cancelled");
        }
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner);
        f.debug_struct("Timer")
            .field("label", &state.label)
            .field("remaining_seconds", &state.remaining_seconds)
            .field("initial_seconds", &state.initial_seconds)
            .field("running", &state.ticker.is_some())
            .finish()
    }
}
