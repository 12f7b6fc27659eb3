//! Error record, kind and envelope types.
//!
//! # Examples
//!
//! ```
//! use error_rail_http::{ErrorKind, ErrorRecord, ResponseEnvelope};
//!
//! let err = ErrorRecord::new(ErrorKind::NotFound, "user 42 not found")
//!     .with_module("users")
//!     .with_request_id("req-1");
//!
//! assert_eq!(err.to_string(), "[NOT_FOUND] user 42 not found");
//!
//! let envelope: ResponseEnvelope<()> = ResponseEnvelope::failure(err);
//! assert!(!envelope.is_success());
//! ```
use smallvec::SmallVec;

pub mod envelope;
pub mod error_kind;
pub mod error_record;

pub use envelope::*;
pub use error_kind::*;
pub use error_record::*;

/// SmallVec-backed storage for rendered call sites.
///
/// Traces are capped at a handful of frames, so the common case stays inline.
pub type TraceVec = SmallVec<[String; 4]>;
