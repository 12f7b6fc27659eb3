//! Call-site capture for error records.
//!
//! [`capture`] walks the frames reported by a [`StackIntrospector`], drops the
//! ones that belong to this crate, the standard library, or the transport
//! stack (see [`TraceConfig::skip_prefixes`]), and renders what is left as
//! `file:line function` strings. The first retained frame also names the
//! originating module.
//!
//! Capture degrades instead of failing: with no frames available the trace is
//! empty and the module is `"unknown"`.
//!
//! # Examples
//!
//! ```
//! use error_rail_http::trace::{capture, NoopIntrospector, TraceConfig};
//!
//! let captured = capture(&NoopIntrospector, &TraceConfig::default());
//! assert!(captured.trace.is_empty());
//! assert_eq!(captured.module, "unknown");
//! ```

mod introspect;

pub use introspect::{BacktraceIntrospector, NoopIntrospector, RawFrame, StackIntrospector};

use crate::types::TraceVec;

/// Module name used when no frame qualifies.
pub const UNKNOWN_MODULE: &str = "unknown";

/// Default maximum number of frames kept in a trace.
pub const DEFAULT_MAX_DEPTH: usize = 10;

const DEFAULT_SKIP_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "backtrace::",
    "error_rail_http::",
    "tower::",
    "tower_service::",
    "tower_layer::",
    "hyper::",
    "axum::",
    "tokio::",
    "futures_util::",
    "futures_core::",
    "test::",
    "__rust",
    "rust_begin_unwind",
    "_start",
    "__libc_start",
    "start_thread",
];

const DEFAULT_GENERIC_SEGMENTS: &[&str] = &["internal", "pkg", "{{closure}}"];

/// Controls how call sites are captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfig {
    /// When `false`, no introspection happens at all.
    pub enabled: bool,
    pub max_depth: usize,
    /// Function-path prefixes whose frames are never recorded.
    pub skip_prefixes: Vec<String>,
    /// Path segments that are too generic to name a module.
    pub generic_segments: Vec<String>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: DEFAULT_MAX_DEPTH,
            skip_prefixes: DEFAULT_SKIP_PREFIXES.iter().map(|s| (*s).to_owned()).collect(),
            generic_segments: DEFAULT_GENERIC_SEGMENTS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl TraceConfig {
    /// A configuration that captures nothing.
    #[inline]
    pub fn disabled() -> Self {
        Self { enabled: false, ..Default::default() }
    }

    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Adds a function-path prefix to the deny-list.
    #[inline]
    pub fn with_skip_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.skip_prefixes.push(prefix.into());
        self
    }

    /// Adds a path segment that module inference should step over.
    #[inline]
    pub fn with_generic_segment<S: Into<String>>(mut self, segment: S) -> Self {
        self.generic_segments.push(segment.into());
        self
    }

    /// Returns `true` if frames of `function` are excluded from traces.
    ///
    /// Trait-impl paths such as `<tower::util::Oneshot<S> as Future>::poll`
    /// are matched on their self type. When the self type names no crate
    /// (`fn() -> T`, `&mut F`, `[T]`, a bare type parameter) the trait path
    /// is matched instead, so `<&mut F as core::ops::FnOnce<A>>::call_once`
    /// is skipped while `<billing::Invoice as core::fmt::Display>::fmt` is kept.
    pub fn is_skipped(&self, function: &str) -> bool {
        match split_qualified(function) {
            Some((self_ty, trait_path)) => {
                let self_ty = strip_type_sigils(self_ty);
                if self.is_denied(self_ty) {
                    return true;
                }
                !is_crate_path(self_ty) && trait_path.is_some_and(|path| self.is_denied(strip_type_sigils(path)))
            },
            None => self.is_denied(function),
        }
    }

    fn is_denied(&self, path: &str) -> bool {
        self.skip_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    fn is_generic(&self, segment: &str) -> bool {
        self.generic_segments.iter().any(|g| g == segment)
    }
}

/// Splits `<SelfType as Trait>::method` into its self type and trait path.
///
/// Returns `None` for plain paths. `->` inside `fn` types does not close the
/// qualified path.
fn split_qualified(function: &str) -> Option<(&str, Option<&str>)> {
    let inner = function.strip_prefix('<')?;
    let bytes = inner.as_bytes();
    let mut depth = 0usize;

    for (i, &byte) in bytes.iter().enumerate() {
        match byte {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {},
            b'>' if depth == 0 => return Some((&inner[..i], None)),
            b'>' => depth -= 1,
            b' ' if depth == 0 && inner[i..].starts_with(" as ") => {
                return Some((&inner[..i], Some(&inner[i + 4..])));
            },
            _ => {},
        }
    }
    Some((inner, None))
}

/// Drops reference, pointer, `dyn` and bracket sigils in front of a type.
fn strip_type_sigils(mut ty: &str) -> &str {
    loop {
        let trimmed = ty.trim_start_matches(['&', '*', '<', '(', '[']).trim_start();
        let trimmed = ["mut ", "const ", "dyn "]
            .iter()
            .find_map(|keyword| trimmed.strip_prefix(keyword))
            .unwrap_or(trimmed);
        if trimmed.len() == ty.len() {
            return ty;
        }
        ty = trimmed;
    }
}

/// `true` when `ty` starts with `crate_name::`.
fn is_crate_path(ty: &str) -> bool {
    ty.find("::").is_some_and(|end| {
        end > 0 && ty[..end].chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// Result of a capture: rendered call sites plus the inferred module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedTrace {
    pub trace: TraceVec,
    pub module: String,
}

impl CapturedTrace {
    fn empty() -> Self {
        Self { trace: TraceVec::new(), module: UNKNOWN_MODULE.to_owned() }
    }
}

/// Captures the current call sites with `introspector` according to `config`.
pub fn capture(introspector: &dyn StackIntrospector, config: &TraceConfig) -> CapturedTrace {
    if !config.enabled || config.max_depth == 0 {
        return CapturedTrace::empty();
    }

    let frames = introspector.frames();
    let mut kept = frames.iter().filter(|frame| !config.is_skipped(&frame.function)).peekable();

    let module = match kept.peek() {
        Some(frame) => infer_module(&frame.function, config),
        None => return CapturedTrace::empty(),
    };
    let trace = kept.take(config.max_depth).map(render_frame).collect();

    CapturedTrace { trace, module }
}

/// Renders a frame as `file:line function`.
pub fn render_frame(frame: &RawFrame) -> String {
    let file = frame.file.as_deref().unwrap_or("<unknown>");
    format!("{}:{} {}", file, frame.line.unwrap_or(0), frame.function)
}

/// Picks the last meaningful segment of a function path.
///
/// The path is split on `:`, `/`, `.`, angle brackets and whitespace;
/// generic segments and symbol hashes are skipped.
pub fn infer_module(function: &str, config: &TraceConfig) -> String {
    function
        .split(|c: char| matches!(c, ':' | '/' | '.' | '<' | '>') || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .rev()
        .find(|segment| !config.is_generic(segment) && !is_symbol_hash(segment))
        .map_or_else(|| UNKNOWN_MODULE.to_owned(), str::to_owned)
}

fn is_symbol_hash(segment: &str) -> bool {
    segment.len() == 17
        && segment.starts_with('h')
        && segment[1..].bytes().all(|b| b.is_ascii_hexdigit())
}
