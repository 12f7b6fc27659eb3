//! Uniform error records and JSON response envelopes for HTTP services.
//!
//! Each submodule re-exports its public surface from here, so consumers can
//! simply depend on `error_rail_http::*` or pick focused pieces as needed.
//!
//! # Examples
//!
//! ## Error Record
//!
//! ```
//! use error_rail_http::{ErrorKind, ErrorRecord};
//! use serde_json::json;
//!
//! let err = ErrorRecord::new(ErrorKind::Validation, "invalid input")
//!     .with_module("user-service")
//!     .with_details(json!({"field": "email"}))
//!     .with_request_id("req-123")
//!     .without_trace();
//!
//! assert_eq!(err.render_message(), "[VALIDATION_ERROR] invalid input");
//! assert_eq!(err.status_code(), 400);
//! ```
//!
//! ## Writing Responses
//!
//! ```
//! use error_rail_http::codec::{error_response, success_response};
//! use error_rail_http::ErrorRecord;
//! use http::StatusCode;
//!
//! let response = error_response(&ErrorRecord::forbidden("access denied"));
//! assert_eq!(response.status(), StatusCode::FORBIDDEN);
//!
//! let response = success_response(&vec![1, 2, 3]).unwrap();
//! assert_eq!(response.body(), br#"{"success":true,"data":[1,2,3]}"#);
//! ```
//!
//! ## Request Boundary
//!
//! ```
//! use error_rail_http::context::{get_request_id, with_request_id, RequestContext};
//! use error_rail_http::recovery::recover;
//! use http::{Response, StatusCode};
//!
//! let mut response = Response::new(Vec::new());
//! with_request_id(&RequestContext::new(), |ctx| {
//!     assert!(!get_request_id(ctx).is_empty());
//!     recover(&mut response, |_| panic!("handler bug"));
//! });
//!
//! assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
//! ```

/// Envelope writers and the response sink abstraction
pub mod codec;
/// Request-scoped context and request id helpers
pub mod context;
/// Convenience re-exports for quick starts
pub mod prelude;
/// Panic containment for request handlers
pub mod recovery;
/// ErrorKind to HTTP status mapping
pub mod status;
/// Call-site capture for error records
pub mod trace;
/// ErrorRecord, ErrorKind and envelope types
pub mod types;

/// Tower integration - Layer and Service implementations (requires `tower` feature)
#[cfg(feature = "tower")]
pub mod tower;

pub use codec::{write_error, write_success, CodecError, ResponseSink};
pub use context::{get_request_id, RequestContext, RequestContextExt};
pub use status::status_code;
pub use trace::TraceConfig;
pub use types::{ErrorKind, ErrorRecord, ErrorType, Priority, ResponseEnvelope, TraceVec};
