//! Duplicate rollup
//!
//! The first message for a distinct (level, format, fields) key is emitted
//! immediately and opens a window of fixed length. Repeats inside the window
//! are counted and held back. When the window closes a single summary is
//! emitted carrying `rollup-count`, the number of repeats suppressed. The
//! window is measured from the first message; repeats do not extend it.
//!
//! Windows are closed at their deadline by one `rollup-flush` worker thread
//! per rollup logger, shared by all of its views. A window found expired by
//! a later log call is closed inline, and stale deadlines are ignored by
//! generation. Closed windows are dropped from the window map.

use super::{
    clock::{add_duration, Clock, SystemClock},
    error::{LoggerError, Result},
    fields::{Fields, FIELD_CALLER, FIELD_ROLLUP},
    log_level::LogLevel,
    logger::Logger,
    message::LogMessage,
    minimal::MinimalLogger,
};
use chrono::{DateTime, Utc};
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RollupKey {
    view: u64,
    level: LogLevel,
    format: String,
    fields: String,
}

impl RollupKey {
    fn new(view: u64, level: LogLevel, message: &LogMessage, fields: &Fields) -> Self {
        let fields = fields
            .sorted()
            .into_iter()
            .filter(|(key, _)| key.as_str() != FIELD_CALLER)
            .map(|(key, value)| format!("{}={}", key, value.to_json_value()))
            .collect::<Vec<_>>()
            .join(",");

        Self {
            view,
            level,
            format: message.format().to_string(),
            fields,
        }
    }
}

struct Stashed {
    fields: Fields,
    message: LogMessage,
}

#[derive(Default)]
struct WindowState {
    open: bool,
    /// Removed from the window map; callers must look the key up again
    retired: bool,
    generation: u64,
    deadline: Option<DateTime<Utc>>,
    count: u64,
    stashed: Option<Stashed>,
}

struct Summary {
    fields: Fields,
    message: LogMessage,
}

impl WindowState {
    /// Close the window, returning the summary to emit if repeats arrived
    fn close(&mut self) -> Option<Summary> {
        self.open = false;
        self.deadline = None;
        let count = std::mem::take(&mut self.count);
        let stashed = self.stashed.take()?;
        if count <= 1 {
            return None;
        }

        let mut fields = stashed.fields;
        fields.insert(FIELD_ROLLUP, count - 1);
        Some(Summary {
            fields,
            message: stashed.message,
        })
    }
}

struct Window {
    key: RollupKey,
    /// View the first message was logged through
    logger: Logger,
    state: Mutex<WindowState>,
}

/// A window deadline handed to the flush worker
struct FlushRequest {
    deadline: DateTime<Utc>,
    window: Arc<Window>,
    generation: u64,
}

/// Heap entry; the earliest deadline sorts greatest
struct Scheduled {
    request: FlushRequest,
    sequence: u64,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .request
            .deadline
            .cmp(&self.request.deadline)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

struct RollupShared {
    window: Duration,
    windows: Mutex<HashMap<RollupKey, Arc<Window>>>,
    next_view: AtomicU64,
    scheduler: Sender<FlushRequest>,
    clock: Arc<dyn Clock>,
    /// Summaries taken from a window and not yet written
    in_flight: Mutex<usize>,
    idle: Condvar,
}

impl RollupShared {
    fn window_for(&self, key: &RollupKey, logger: &Logger) -> Arc<Window> {
        let mut windows = self.windows.lock();
        if let Some(window) = windows.get(key) {
            return Arc::clone(window);
        }

        let window = Arc::new(Window {
            key: key.clone(),
            logger: logger.clone(),
            state: Mutex::new(WindowState::default()),
        });
        windows.insert(key.clone(), Arc::clone(&window));
        window
    }

    /// Drop `window` from the map unless its key already maps to a newer window
    fn retire(&self, window: &Arc<Window>) {
        let mut windows = self.windows.lock();
        if windows
            .get(&window.key)
            .is_some_and(|current| Arc::ptr_eq(current, window))
        {
            windows.remove(&window.key);
        }
    }

    /// Close the window if it is still the given generation (any open
    /// generation when `None`), retire it and write its summary.
    fn flush(&self, window: &Arc<Window>, generation: Option<u64>) -> Result<()> {
        let summary = {
            let mut state = window.state.lock();
            if !state.open || generation.is_some_and(|g| g != state.generation) {
                return Ok(());
            }
            let summary = state.close();
            state.retired = true;
            self.retire(window);
            if summary.is_some() {
                *self.in_flight.lock() += 1;
            }
            summary
        };

        match summary {
            Some(summary) => {
                let result = window
                    .logger
                    .forward(window.key.level, summary.fields, summary.message);
                self.finish_flush();
                result
            }
            None => Ok(()),
        }
    }

    fn finish_flush(&self) {
        let mut in_flight = self.in_flight.lock();
        *in_flight -= 1;
        if *in_flight == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut in_flight = self.in_flight.lock();
        while *in_flight > 0 {
            self.idle.wait(&mut in_flight);
        }
    }

    fn schedule(&self, window: &Arc<Window>, deadline: DateTime<Utc>, generation: u64) -> Result<()> {
        self.scheduler
            .send(FlushRequest {
                deadline,
                window: Arc::clone(window),
                generation,
            })
            .map_err(|_| LoggerError::other("rollup flush worker has stopped"))
    }
}

/// Body of the `rollup-flush` thread.
///
/// Holds pending deadlines in a heap and sleeps on a clock timer for the
/// earliest one. Exits once every handle to the rollup logger is gone.
fn run_flush_worker(shared: Weak<RollupShared>, clock: Arc<dyn Clock>, requests: Receiver<FlushRequest>) {
    let mut pending: BinaryHeap<Scheduled> = BinaryHeap::new();
    let mut sequence = 0u64;
    let mut timer: Option<(DateTime<Utc>, Receiver<Instant>)> = None;

    loop {
        let now = clock.now();
        while pending.peek().is_some_and(|next| next.request.deadline <= now) {
            let Some(due) = pending.pop() else { break };
            let Some(rollup) = shared.upgrade() else { return };
            // Write failures are held by the base adapter for the next sync.
            let _ = rollup.flush(&due.request.window, Some(due.request.generation));
        }

        let received = match pending.peek().map(|next| next.request.deadline) {
            None => match requests.recv() {
                Ok(request) => request,
                Err(_) => return,
            },
            Some(next) => {
                let current = match timer.take() {
                    Some((deadline, current)) if deadline == next => current,
                    _ => clock.after((next - now).to_std().unwrap_or(Duration::ZERO)),
                };
                // The clock may have moved between reading `now` and arming the timer.
                if clock.now() >= next {
                    continue;
                }
                let received = select! {
                    recv(requests) -> request => match request {
                        Ok(request) => Some(request),
                        Err(_) => return,
                    },
                    recv(current) -> _ => None,
                };
                match received {
                    Some(request) => {
                        timer = Some((next, current));
                        request
                    }
                    None => continue,
                }
            }
        };

        sequence += 1;
        pending.push(Scheduled {
            request: received,
            sequence,
        });
    }
}

/// Logger that collapses repeated messages into a periodic summary
///
/// # Example
/// ```
/// use rust_log_facade::prelude::*;
/// use std::time::Duration;
///
/// let sink = MemorySink::new();
/// let base = Logger::builder().sink(sink.clone()).build();
/// let logger = RollupLogger::new(base, Duration::from_secs(60))?.into_logger();
///
/// for _ in 0..3 {
///     logger.info("connection refused");
/// }
/// assert_eq!(sink.len(), 1);
///
/// logger.sync()?;
/// assert_eq!(sink.len(), 2);
/// # Ok::<(), rust_log_facade::LoggerError>(())
/// ```
pub struct RollupLogger {
    inner: Logger,
    view: u64,
    shared: Arc<RollupShared>,
}

impl RollupLogger {
    /// Roll up duplicates of `logger` over windows of `window`
    pub fn new(logger: Logger, window: Duration) -> Result<Self> {
        Self::with_clock(logger, window, SystemClock)
    }

    /// Fails when the flush worker thread cannot be started
    pub fn with_clock<C: Clock + 'static>(
        logger: Logger,
        window: Duration,
        clock: C,
    ) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(clock);
        let (scheduler, requests) = unbounded();
        let shared = Arc::new(RollupShared {
            window,
            windows: Mutex::new(HashMap::new()),
            next_view: AtomicU64::new(1),
            scheduler,
            clock: Arc::clone(&clock),
            in_flight: Mutex::new(0),
            idle: Condvar::new(),
        });

        let worker_shared = Arc::downgrade(&shared);
        thread::Builder::new()
            .name("rollup-flush".to_string())
            .spawn(move || run_flush_worker(worker_shared, clock, requests))
            .map_err(|e| LoggerError::io_operation("spawning", "rollup flush worker", e))?;

        Ok(Self {
            inner: logger,
            view: 0,
            shared,
        })
    }

    /// Window length
    pub fn window(&self) -> Duration {
        self.shared.window
    }

    /// Number of windows currently collecting repeats
    pub fn open_windows(&self) -> usize {
        let windows: Vec<_> = self.shared.windows.lock().values().cloned().collect();
        windows.iter().filter(|w| w.state.lock().open).count()
    }

    #[must_use]
    pub fn into_logger(self) -> Logger {
        Logger::from_minimal(self)
    }
}

impl From<RollupLogger> for Logger {
    fn from(rollup: RollupLogger) -> Logger {
        rollup.into_logger()
    }
}

impl MinimalLogger for RollupLogger {
    fn with_fields(self: Arc<Self>, fields: Fields) -> Arc<dyn MinimalLogger> {
        if fields.is_empty() {
            return self;
        }

        Arc::new(RollupLogger {
            inner: self.inner.with_fields(fields),
            view: self.shared.next_view.fetch_add(1, Ordering::Relaxed),
            shared: Arc::clone(&self.shared),
        })
    }

    fn log_with_fields(&self, level: LogLevel, fields: Fields, message: LogMessage) -> Result<()> {
        if level == LogLevel::Fatal || !self.inner.enabled(level) {
            return self.inner.forward(level, fields, message);
        }

        let shared = &self.shared;
        let key = RollupKey::new(self.view, level, &message, &fields);
        let now = shared.clock.now();

        let (window, expired, deadline, generation) = loop {
            let window = shared.window_for(&key, &self.inner);
            let mut state = window.state.lock();
            if state.retired {
                continue;
            }

            let deadline = state.deadline;
            let expired = match deadline {
                Some(deadline) if state.open && now >= deadline => {
                    let summary = state.close();
                    if summary.is_some() {
                        *shared.in_flight.lock() += 1;
                    }
                    summary
                }
                _ => None,
            };

            if state.open {
                state.count += 1;
                if state.stashed.is_none() {
                    state.stashed = Some(Stashed { fields, message });
                }
                return Ok(());
            }

            let deadline = add_duration(now, shared.window);
            state.open = true;
            state.generation += 1;
            state.deadline = Some(deadline);
            state.count = 1;
            let generation = state.generation;
            drop(state);
            break (window, expired, deadline, generation);
        };

        let summarized = match expired {
            Some(summary) => {
                let result = self
                    .inner
                    .forward(level, summary.fields, summary.message);
                shared.finish_flush();
                result
            }
            None => Ok(()),
        };

        let scheduled = shared.schedule(&window, deadline, generation);
        let written = self.inner.forward(level, fields, message);
        summarized.and(written).and(scheduled)
    }

    fn enabled(&self, level: LogLevel) -> bool {
        self.inner.enabled(level)
    }

    /// Close every open window, wait for summaries being written by the
    /// flush worker, then sync the wrapped logger.
    fn sync(&self) -> Result<()> {
        let windows: Vec<Arc<Window>> = self.shared.windows.lock().values().cloned().collect();

        let mut flushed = Ok(());
        for window in &windows {
            if let Err(err) = self.shared.flush(window, None) {
                if flushed.is_ok() {
                    flushed = Err(err);
                }
            }
        }

        self.shared.wait_idle();
        let synced = self.inner.sync();
        flushed.and(synced)
    }
}
