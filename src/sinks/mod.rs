//! Sink implementations

pub mod console;
pub mod json;
pub mod memory;

pub use console::ConsoleSink;
pub use json::{JsonFieldNames, JsonSink};
pub use memory::{MemorySink, SharedBuffer};

pub use crate::core::Sink;
