//! Deferred message formatting
//!
//! A [`LogMessage`] keeps the format string and its positional arguments
//! apart until a sink needs the final text. Replay journals and rollup
//! windows rely on this: they key on, store and re-emit the format and
//! arguments rather than a rendered string.

use super::fields::FieldValue;
use std::fmt;

/// A format string with `{}` placeholders plus the arguments that fill them.
///
/// `{{` and `}}` render as literal braces. Placeholders without a matching
/// argument are kept verbatim; surplus arguments are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogMessage {
    format: String,
    args: Vec<FieldValue>,
}

impl LogMessage {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(format: impl Into<String>, args: Vec<FieldValue>) -> Self {
        Self {
            format: format.into(),
            args,
        }
    }

    /// Append one positional argument
    #[must_use]
    pub fn arg(mut self, value: impl Into<FieldValue>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn args(&self) -> &[FieldValue] {
        &self.args
    }

    /// Substitute the arguments into the format string
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.format.len() + self.args.len() * 8);
        let mut args = self.args.iter();
        let mut chars = self.format.chars().peekable();

        while let Some(c) = chars.next() {
            match (c, chars.peek()) {
                ('{', Some('{')) => {
                    chars.next();
                    out.push('{');
                }
                ('}', Some('}')) => {
                    chars.next();
                    out.push('}');
                }
                ('{', Some('}')) => {
                    chars.next();
                    match args.next() {
                        Some(arg) => out.push_str(&arg.to_string()),
                        None => out.push_str("{}"),
                    }
                }
                _ => out.push(c),
            }
        }

        out
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for LogMessage {
    fn from(format: &str) -> Self {
        LogMessage::new(format)
    }
}

impl From<String> for LogMessage {
    fn from(format: String) -> Self {
        LogMessage::new(format)
    }
}

impl From<&String> for LogMessage {
    fn from(format: &String) -> Self {
        LogMessage::new(format.clone())
    }
}

impl From<fmt::Arguments<'_>> for LogMessage {
    fn from(args: fmt::Arguments<'_>) -> Self {
        // Already formatted; escape braces so rendering is the identity.
        LogMessage::new(args.to_string().replace('{', "{{").replace('}', "}}"))
    }
}
