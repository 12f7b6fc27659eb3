//! Panic containment at the request boundary.
//!
//! [`recover`] runs a handler and, if it panics, answers with an
//! `INTERNAL_ERROR` envelope instead of letting the panic escape. The record
//! it writes is built by [`panic_record`], which the tower layer reuses.
//!
//! # Examples
//!
//! ```
//! use error_rail_http::recovery::recover;
//! use http::{Response, StatusCode};
//!
//! let mut response = Response::new(Vec::new());
//! let panicked = recover(&mut response, |_| panic!("index out of range"));
//!
//! assert!(panicked);
//! assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
//! ```

use core::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::codec::{write_error, write_fallback, ResponseSink};
use crate::types::{ErrorKind, ErrorRecord};

/// Module reported by records created for recovered panics.
pub const RECOVERY_MODULE: &str = "middleware";

/// Client-facing message of recovered panics.
pub const PANIC_MESSAGE: &str = "Internal server error";

/// Application code attached to recovered panics.
pub const PANIC_ERROR_CODE: &str = "FS001";

/// Runs `handler` against `sink`, converting a panic into an error response.
///
/// Returns `true` if a panic was contained. Whatever the handler wrote before
/// panicking is superseded by the error envelope.
pub fn recover<S, F>(sink: &mut S, handler: F) -> bool
where
    S: ResponseSink + ?Sized,
    F: FnOnce(&mut S),
{
    let outcome = catch_unwind(AssertUnwindSafe(|| handler(&mut *sink)));
    match outcome {
        Ok(()) => false,
        Err(payload) => {
            respond_to_panic(sink, &*payload, None);
            true
        },
    }
}

/// Writes the error response for a contained panic.
///
/// `request_id` is attached to the record when known.
pub fn respond_to_panic<S>(sink: &mut S, payload: &(dyn Any + Send), request_id: Option<&str>)
where
    S: ResponseSink + ?Sized,
{
    let record = panic_record(payload, request_id);
    if write_error(sink, &record).is_err() {
        #[cfg(feature = "tracing")]
        tracing::error!("failed to write panic response, retrying with fallback");
        let _ = write_fallback(sink);
    }
}

/// Builds the record describing a recovered panic.
///
/// `details` is `"Panic recovered: <payload>"`. Only `&str` and `String`
/// payloads (what `panic!` produces) can be rendered; a value raised with
/// [`std::panic::panic_any`] of any other type is opaque behind `dyn Any`,
/// so its content is lost and the details read
/// `"Panic recovered: non-string panic payload"`.
pub fn panic_record(payload: &(dyn Any + Send), request_id: Option<&str>) -> ErrorRecord {
    let message = panic_message(payload);

    #[cfg(feature = "tracing")]
    tracing::error!(panic = %message, request_id = request_id.unwrap_or(""), "recovered from panic in handler");

    let record = ErrorRecord::new(ErrorKind::Internal, PANIC_MESSAGE)
        .critical()
        .system_error()
        .with_error_code(PANIC_ERROR_CODE)
        .with_user_id("system")
        .with_details(format!("Panic recovered: {}", message))
        .with_module(RECOVERY_MODULE);

    match request_id {
        Some(id) if !id.is_empty() => record.with_request_id(id),
        _ => record,
    }
}

/// Renders a panic payload. Non-string payloads get a placeholder.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
