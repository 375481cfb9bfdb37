//! Replay journal
//!
//! A [`ReplayLogger`] forwards every message immediately and also keeps a
//! copy of the ones logged at a journaled level. [`ReplayLogger::replay`]
//! re-emits the whole journal at a more severe level, each copy tagged with
//! `replayed-from-level`. Once a replay is active, new journaled messages
//! are re-emitted at the active level as they arrive.
//!
//! Views created with [`ReplayLogger::with_fields`] share one journal.

use super::{
    error::Result,
    fields::{Fields, FIELD_REPLAY},
    log_level::LogLevel,
    logger::Logger,
    message::LogMessage,
    minimal::MinimalLogger,
};
use parking_lot::{RwLock, RwLockUpgradableReadGuard, RwLockWriteGuard};
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
struct JournaledMessage {
    /// View the message was logged through; replays merge its fields again
    logger: Logger,
    level: LogLevel,
    fields: Fields,
    message: LogMessage,
}

impl JournaledMessage {
    fn replay(&self, level: LogLevel) -> Result<()> {
        let mut fields = self.fields.clone();
        fields.insert(FIELD_REPLAY, self.level);
        self.logger.forward(level, fields, self.message.clone())
    }
}

#[derive(Default)]
struct JournalState {
    messages: Vec<JournaledMessage>,
    replaying_at: Option<LogLevel>,
}

struct Journal {
    levels: Vec<LogLevel>,
    state: RwLock<JournalState>,
}

impl Journal {
    fn journals(&self, level: LogLevel) -> bool {
        self.levels.contains(&level)
    }

    fn record(&self, entry: JournaledMessage) -> Result<()> {
        let immediate = {
            let mut state = self.state.write();
            let immediate = state.replaying_at.map(|target| (target, entry.clone()));
            state.messages.push(entry);
            immediate
        };

        match immediate {
            Some((target, entry)) => entry.replay(target),
            None => Ok(()),
        }
    }

    fn replay(&self, level: LogLevel) -> Result<()> {
        if level == LogLevel::None {
            return Ok(());
        }

        let state = self.state.upgradable_read();
        if let Some(active) = state.replaying_at {
            if !level.is_more_severe_than(active) {
                return Ok(());
            }
        }

        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        state.replaying_at = Some(level);

        // Appends wait until the scan is done and then replay themselves at
        // the new level, so nothing is emitted twice or skipped.
        let state = RwLockWriteGuard::downgrade(state);
        let mut result = Ok(());
        for message in &state.messages {
            if let Err(err) = message.replay(level) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }
}

/// Minimal logger half of a [`ReplayLogger`]
struct ReplayCore {
    inner: Logger,
    journal: Arc<Journal>,
}

impl MinimalLogger for ReplayCore {
    fn with_fields(self: Arc<Self>, fields: Fields) -> Arc<dyn MinimalLogger> {
        if fields.is_empty() {
            return self;
        }

        Arc::new(ReplayCore {
            inner: self.inner.with_fields(fields),
            journal: Arc::clone(&self.journal),
        })
    }

    fn log_with_fields(&self, level: LogLevel, fields: Fields, message: LogMessage) -> Result<()> {
        // Messages the wrapped chain drops are never journaled.
        let snapshot = (self.journal.journals(level) && self.inner.enabled(level)).then(|| {
            JournaledMessage {
                logger: self.inner.clone(),
                level,
                fields: fields.clone(),
                message: message.clone(),
            }
        });

        let written = self.inner.forward(level, fields, message);
        let recorded = match snapshot {
            Some(entry) => self.journal.record(entry),
            None => Ok(()),
        };
        written.and(recorded)
    }

    fn enabled(&self, level: LogLevel) -> bool {
        self.inner.enabled(level)
    }

    fn sync(&self) -> Result<()> {
        self.inner.sync()
    }
}

/// Logger that journals messages at selected levels for later replay
///
/// Dereferences to [`Logger`] for the logging surface.
///
/// # Example
/// ```
/// use rust_log_facade::prelude::*;
///
/// let sink = MemorySink::new();
/// let base = Logger::builder().min_level(LogLevel::Debug).sink(sink.clone()).build();
/// let logger = ReplayLogger::new(base, &[LogLevel::Debug]);
///
/// logger.debug("connecting");
/// logger.debug("handshake");
/// logger.replay(LogLevel::Error);
///
/// assert_eq!(sink.len(), 4);
/// ```
#[derive(Clone)]
pub struct ReplayLogger {
    logger: Logger,
    core: Arc<ReplayCore>,
}

impl ReplayLogger {
    /// Wrap `logger`, journaling messages logged at any of `levels`
    pub fn new(logger: Logger, levels: &[LogLevel]) -> Self {
        let journal = Arc::new(Journal {
            levels: levels.to_vec(),
            state: RwLock::new(JournalState::default()),
        });
        Self::from_core(Arc::new(ReplayCore {
            inner: logger,
            journal,
        }))
    }

    fn from_core(core: Arc<ReplayCore>) -> Self {
        let logger = Logger::from_arc(Arc::clone(&core) as Arc<dyn MinimalLogger>);
        Self { logger, core }
    }

    /// A view sharing this logger's journal that adds `fields` to new messages
    #[must_use]
    pub fn with_fields(&self, fields: Fields) -> ReplayLogger {
        if fields.is_empty() {
            return self.clone();
        }

        let core = Arc::new(ReplayCore {
            inner: self.core.inner.with_fields(fields),
            journal: Arc::clone(&self.core.journal),
        });
        Self {
            logger: self.logger.with_inner(Arc::clone(&core) as Arc<dyn MinimalLogger>),
            core,
        }
    }

    /// See [`Logger::with_indirect_caller`]
    pub fn with_indirect_caller(&self, frames: usize) -> Result<ReplayLogger> {
        Ok(Self {
            logger: self.logger.with_indirect_caller(frames)?,
            core: Arc::clone(&self.core),
        })
    }

    /// Re-emit every journaled message at `level`.
    ///
    /// Has no effect unless `level` is more severe than the active replay
    /// level. Write failures are held by the base adapter for the next `sync`.
    pub fn replay(&self, level: LogLevel) {
        let _ = self.core.journal.replay(level);
    }

    /// Like [`replay`](Self::replay), returning the first write failure
    pub fn try_replay(&self, level: LogLevel) -> Result<()> {
        self.core.journal.replay(level)
    }

    /// Level of the active replay, if one has happened
    pub fn replaying_at(&self) -> Option<LogLevel> {
        self.core.journal.state.read().replaying_at
    }

    /// Number of messages held by the shared journal
    pub fn journaled_len(&self) -> usize {
        self.core.journal.state.read().messages.len()
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl Deref for ReplayLogger {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        &self.logger
    }
}

impl From<ReplayLogger> for Logger {
    fn from(replay: ReplayLogger) -> Logger {
        replay.logger
    }
}
