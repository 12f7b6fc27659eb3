//! Writing envelopes to a response.
//!
//! The codec serializes an [`ErrorRecord`] or a success payload into a
//! [`ResponseEnvelope`](crate::ResponseEnvelope)-shaped JSON body and writes
//! it, together with the status and content type, to a [`ResponseSink`].
//!
//! The two paths fail differently:
//!
//! - [`write_error`] never gives up on serialization. If the envelope cannot
//!   be encoded it writes a fixed plain-text `500` instead.
//! - [`write_success`] returns [`CodecError::Serialize`] and leaves the sink
//!   untouched, so the caller decides what to answer.
//!
//! # Examples
//!
//! ```
//! use error_rail_http::codec::{write_error, write_success};
//! use error_rail_http::ErrorRecord;
//! use http::{Response, StatusCode};
//!
//! let mut response = Response::new(Vec::new());
//! write_error(&mut response, &ErrorRecord::not_found("no such order")).unwrap();
//! assert_eq!(response.status(), StatusCode::NOT_FOUND);
//!
//! let mut response = Response::new(Vec::new());
//! write_success(&mut response, &serde_json::json!({"id": 7})).unwrap();
//! assert_eq!(response.body(), br#"{"success":true,"data":{"id":7}}"#);
//! ```

use core::fmt;
use std::io;

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::{Response, StatusCode};
use serde::Serialize;

use crate::types::ErrorRecord;

/// Media type of envelope bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// Body written when an error envelope cannot be serialized.
pub const FALLBACK_BODY: &str = "Internal server error\n";

const FALLBACK_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Minimal response surface the codec writes to.
///
/// Metadata (headers, status) is always set before the body is written.
pub trait ResponseSink {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    fn set_status(&mut self, status: StatusCode);

    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Buffered responses keep only the last body written.
impl ResponseSink for Response<Vec<u8>> {
    #[inline]
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }

    #[inline]
    fn set_status(&mut self, status: StatusCode) {
        *self.status_mut() = status;
    }

    #[inline]
    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        let body = self.body_mut();
        body.clear();
        body.extend_from_slice(bytes);
        Ok(())
    }
}

/// Failure modes of the codec.
#[derive(Debug)]
pub enum CodecError {
    /// The success payload could not be encoded.
    Serialize(serde_json::Error),
    /// The sink rejected the body.
    Io(io::Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Serialize(err) => write!(f, "failed to serialize response envelope: {}", err),
            CodecError::Io(err) => write!(f, "failed to write response body: {}", err),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Serialize(err) => Some(err),
            CodecError::Io(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    #[inline]
    fn from(err: serde_json::Error) -> Self {
        CodecError::Serialize(err)
    }
}

impl From<io::Error> for CodecError {
    #[inline]
    fn from(err: io::Error) -> Self {
        CodecError::Io(err)
    }
}

#[derive(Serialize)]
struct FailureEnvelope<'a> {
    success: bool,
    error: &'a ErrorRecord,
}

#[derive(Serialize)]
struct SuccessEnvelope<'a, T: ?Sized> {
    success: bool,
    data: &'a T,
}

/// Writes `record` as a failure envelope with the status of its kind.
///
/// Falls back to [`write_fallback`] if the envelope cannot be serialized.
/// Only an I/O failure of the sink itself is returned.
pub fn write_error<S>(sink: &mut S, record: &ErrorRecord) -> Result<(), CodecError>
where
    S: ResponseSink + ?Sized,
{
    let status = record.status_code();
    let encoded = serde_json::to_vec(&FailureEnvelope { success: false, error: record });

    #[cfg(feature = "tracing")]
    {
        if status.is_server_error() {
            tracing::warn!(code = %record.kind(), status = status.as_u16(), "writing error response");
        } else {
            tracing::debug!(code = %record.kind(), status = status.as_u16(), "writing error response");
        }
    }

    emit_error(sink, status, encoded)
}

fn emit_error<S>(
    sink: &mut S,
    status: StatusCode,
    encoded: Result<Vec<u8>, serde_json::Error>,
) -> Result<(), CodecError>
where
    S: ResponseSink + ?Sized,
{
    match encoded {
        Ok(body) => write_json(sink, status, &body),
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::error!(error = %_err, "error envelope serialization failed, sending fallback");
            write_fallback(sink)
        },
    }
}

/// Writes the fixed plain-text `500` response.
pub fn write_fallback<S>(sink: &mut S) -> Result<(), CodecError>
where
    S: ResponseSink + ?Sized,
{
    sink.set_header(CONTENT_TYPE, HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
    sink.set_header(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    sink.set_status(StatusCode::INTERNAL_SERVER_ERROR);
    sink.write_body(FALLBACK_BODY.as_bytes())?;
    Ok(())
}

/// Writes `data` as a success envelope with status `200`.
///
/// Serialization errors are returned and nothing is written.
pub fn write_success<S, T>(sink: &mut S, data: &T) -> Result<(), CodecError>
where
    S: ResponseSink + ?Sized,
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(&SuccessEnvelope { success: true, data })?;
    write_json(sink, StatusCode::OK, &body)
}

fn write_json<S>(sink: &mut S, status: StatusCode, body: &[u8]) -> Result<(), CodecError>
where
    S: ResponseSink + ?Sized,
{
    sink.set_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    sink.set_status(status);
    sink.write_body(body)?;
    Ok(())
}

/// Builds a complete error response for `record`.
pub fn error_response(record: &ErrorRecord) -> Response<Vec<u8>> {
    let mut response = Response::new(Vec::new());
    // The in-memory sink never reports I/O errors.
    let _ = write_error(&mut response, record);
    response
}

/// Builds a complete success response for `data`.
pub fn success_response<T>(data: &T) -> Result<Response<Vec<u8>>, CodecError>
where
    T: Serialize + ?Sized,
{
    let mut response = Response::new(Vec::new());
    write_success(&mut response, data)?;
    Ok(response)
}
