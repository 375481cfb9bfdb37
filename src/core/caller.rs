//! Call-site capture
//!
//! The logging boundary is marked `#[track_caller]`, so
//! [`Location::caller`] already names the line that called the logger.
//! Helpers that wrap the logger ask for additional frames through
//! `Logger::with_indirect_caller`; those are found by walking the stack,
//! starting at the frame that matches the tracked location.

use std::panic::Location;
use std::path::Path;

/// A resolved source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    file: String,
    line: u32,
}

impl CallSite {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// `dir/file.rs:LINE`, the value of the `caller` field
    pub fn to_field(&self) -> String {
        format!("{}:{}", trim_path(&self.file), self.line)
    }
}

impl From<&Location<'_>> for CallSite {
    fn from(location: &Location<'_>) -> Self {
        CallSite::new(location.file(), location.line())
    }
}

/// Capture the call site `depth` frames above the caller of the
/// `#[track_caller]` function this is invoked from.
///
/// Falls back to the tracked location when the stack cannot be resolved
/// (stripped binaries, missing debug info).
#[track_caller]
pub fn capture(depth: usize) -> CallSite {
    let anchor = Location::caller();
    if depth == 0 {
        return CallSite::from(anchor);
    }

    resolve_indirect(anchor, depth).unwrap_or_else(|| CallSite::from(anchor))
}

fn resolve_indirect(anchor: &Location<'_>, depth: usize) -> Option<CallSite> {
    let mut anchored = false;
    let mut remaining = depth;
    let mut found = None;

    backtrace::trace(|frame| {
        let mut keep_going = true;
        backtrace::resolve_frame(frame, |symbol| {
            if !keep_going {
                return;
            }
            let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) else {
                return;
            };

            if !anchored {
                anchored = line == anchor.line() && same_file(file, anchor.file());
                return;
            }

            remaining -= 1;
            if remaining == 0 {
                found = Some(CallSite::new(file.to_string_lossy(), line));
                keep_going = false;
            }
        });
        keep_going
    });

    found
}

/// `#[track_caller]` paths are relative to the crate root while debug info
/// paths are usually absolute, so compare by trailing components.
fn same_file(resolved: &Path, tracked: &str) -> bool {
    resolved.ends_with(Path::new(tracked))
}

/// Keep the last two components of a path.
pub fn trim_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let Some(last) = path.rfind('/') else {
        return path;
    };
    match path[..last].rfind('/') {
        Some(prev) => path[prev + 1..].to_string(),
        None => path,
    }
}
