//! Stack introspection capability.
//!
//! Call-stack access is platform dependent, so record construction goes
//! through the [`StackIntrospector`] trait. [`BacktraceIntrospector`] reads
//! frames from [`std::backtrace::Backtrace`]; [`NoopIntrospector`] is the
//! stand-in for targets where that yields nothing useful.

use std::backtrace::{Backtrace, BacktraceStatus};

/// One call-stack frame as reported by an introspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Fully qualified function path, e.g. `my_service::handlers::get_user`.
    pub function: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl RawFrame {
    /// Creates a frame without location information.
    #[inline]
    pub fn new<S: Into<String>>(function: S) -> Self {
        Self { function: function.into(), file: None, line: None }
    }

    /// Attaches a source location.
    #[inline]
    pub fn at<S: Into<String>>(mut self, file: S, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }
}

/// Source of call-stack frames, innermost first.
///
/// Implementations must not panic; when the stack cannot be read they return
/// an empty list.
pub trait StackIntrospector {
    fn frames(&self) -> Vec<RawFrame>;
}

/// Introspector backed by [`Backtrace::force_capture`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceIntrospector;

impl StackIntrospector for BacktraceIntrospector {
    fn frames(&self) -> Vec<RawFrame> {
        let backtrace = Backtrace::force_capture();
        if backtrace.status() != BacktraceStatus::Captured {
            return Vec::new();
        }
        parse_backtrace(&backtrace.to_string())
    }
}

/// Introspector that never reports frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIntrospector;

impl StackIntrospector for NoopIntrospector {
    #[inline]
    fn frames(&self) -> Vec<RawFrame> {
        Vec::new()
    }
}

/// Parses the rendered form of a [`Backtrace`].
///
/// Each frame is a `N: function` line optionally followed by an
/// `at file:line:col` line. Unsymbolized frames (`<unknown>`) are dropped.
pub(crate) fn parse_backtrace(rendered: &str) -> Vec<RawFrame> {
    let mut frames: Vec<RawFrame> = Vec::new();
    // Set while the last pushed frame is still waiting for its location.
    let mut open = false;

    for line in rendered.lines() {
        let line = line.trim();

        if let Some(location) = line.strip_prefix("at ") {
            if open {
                if let Some(frame) = frames.last_mut() {
                    let (file, number) = parse_location(location);
                    frame.file = Some(file.to_owned());
                    frame.line = number;
                }
                open = false;
            }
            continue;
        }

        open = false;
        let Some(name) = strip_frame_index(line) else {
            continue;
        };
        if name.is_empty() || name == "<unknown>" {
            continue;
        }
        frames.push(RawFrame::new(name));
        open = true;
    }

    frames
}

fn strip_frame_index(line: &str) -> Option<&str> {
    let (index, rest) = line.split_once(':')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(rest.trim())
}

fn parse_location(location: &str) -> (&str, Option<u32>) {
    let location = location.trim();

    // file:line:col
    let mut parts = location.rsplitn(3, ':');
    if let (Some(col), Some(line), Some(file)) = (parts.next(), parts.next(), parts.next()) {
        if col.parse::<u32>().is_ok() {
            if let Ok(line) = line.parse::<u32>() {
                return (file, Some(line));
            }
        }
    }

    // file:line
    match location.rsplit_once(':') {
        Some((file, line)) => match line.parse::<u32>() {
            Ok(line) => (file, Some(line)),
            Err(_) => (location, None),
        },
        None => (location, None),
    }
}
