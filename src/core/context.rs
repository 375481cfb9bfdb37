//! Request-scoped context and logger propagation
//!
//! A [`Context`] is an immutable bag of typed values. Attaching a value
//! returns a new context and leaves the original untouched, so a context
//! can be handed down a call tree and extended at each level.

use super::logger::Logger;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Context {
    values: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Context {
    /// An empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of this context carrying `value`, replacing any previous value of the same type
    #[must_use]
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Context {
        let mut values = (*self.values).clone();
        values.insert(TypeId::of::<T>(), Arc::new(value));
        Context {
            values: Arc::new(values),
        }
    }

    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("values", &self.values.len()).finish()
    }
}

struct LoggerSlot(Logger);

/// Attach `logger` to a copy of `ctx`
#[must_use]
pub fn with_logger(ctx: &Context, logger: Logger) -> Context {
    ctx.with_value(LoggerSlot(logger))
}

/// The logger attached to `ctx`, or a nil logger when there is none
pub fn from_context(ctx: &Context) -> Logger {
    ctx.value::<LoggerSlot>()
        .map(|slot| slot.0.clone())
        .unwrap_or_else(Logger::nil)
}
