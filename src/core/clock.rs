//! Time sources
//!
//! The base adapter stamps records with [`Clock::now`] and rollup windows
//! are closed by timers obtained from [`Clock::after`]. [`MockClock`] only
//! moves when told to, which makes window boundaries testable.

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// A channel that receives one value once `duration` has elapsed
    fn after(&self, duration: Duration) -> Receiver<Instant>;
}

/// Real time, timers backed by `crossbeam_channel::after`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn after(&self, duration: Duration) -> Receiver<Instant> {
        crossbeam_channel::after(duration)
    }
}

struct PendingTimer {
    deadline: DateTime<Utc>,
    sender: Sender<Instant>,
}

struct MockState {
    now: DateTime<Utc>,
    timers: Vec<PendingTimer>,
}

/// Manually advanced clock for tests
///
/// # Example
///
/// ```
/// use rust_log_facade::core::{Clock, MockClock};
/// use std::time::Duration;
///
/// let clock = MockClock::new();
/// let timer = clock.after(Duration::from_secs(1));
/// assert!(timer.try_recv().is_err());
///
/// clock.advance(Duration::from_secs(1));
/// assert!(timer.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct MockClock {
    state: Arc<Mutex<MockState>>,
}

impl MockClock {
    /// A mock clock frozen at the current time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// A mock clock frozen at the given time
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                now,
                timers: Vec::new(),
            })),
        }
    }

    /// Move time forward and fire every timer whose deadline has been reached
    pub fn advance(&self, duration: Duration) {
        let due = {
            let mut state = self.state.lock();
            state.now = add_duration(state.now, duration);
            let now = state.now;
            let (due, pending): (Vec<_>, Vec<_>) =
                state.timers.drain(..).partition(|t| t.deadline <= now);
            state.timers = pending;
            due
        };

        for timer in due {
            // The receiving side may have gone away; nothing to do then.
            let _ = timer.sender.send(Instant::now());
        }
    }

    /// Number of timers registered and not yet fired
    pub fn pending_timers(&self) -> usize {
        self.state.lock().timers.len()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.state.lock().now
    }

    fn after(&self, duration: Duration) -> Receiver<Instant> {
        let (sender, receiver) = bounded(1);
        let mut state = self.state.lock();
        let deadline = add_duration(state.now, duration);
        if duration.is_zero() {
            let _ = sender.send(Instant::now());
        } else {
            state.timers.push(PendingTimer { deadline, sender });
        }
        receiver
    }
}

/// `time + duration`, saturating at the latest representable instant
pub(crate) fn add_duration(time: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|delta| time.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
