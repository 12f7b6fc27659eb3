//! Convenience re-exports for common usage patterns.
//!
//! ```
//! use error_rail_http::prelude::*;
//!
//! fn load_user(id: u64) -> Result<String, ErrorRecord> {
//!     Err(ErrorRecord::not_found(format!("user {id} not found")).with_module("users"))
//! }
//!
//! let mut response = http::Response::new(Vec::new());
//! match load_user(7) {
//!     Ok(user) => write_success(&mut response, &user).unwrap(),
//!     Err(err) => write_error(&mut response, &err).unwrap(),
//! }
//! assert_eq!(response.status(), 404);
//! ```

// Core types
pub use crate::types::{ErrorKind, ErrorRecord, ErrorType, Priority, ResponseEnvelope};

// Codec
pub use crate::codec::{write_error, write_success, CodecError, ResponseSink};

// Middleware helpers
pub use crate::context::{get_request_id, with_request_id, RequestContext, RequestContextExt};
pub use crate::recovery::recover;

#[cfg(feature = "tower")]
pub use crate::tower::{RecoveryLayer, RequestIdLayer, ServiceBoundaryExt};
