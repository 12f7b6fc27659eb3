//! Mapping from [`ErrorKind`] to HTTP status codes.
//!
//! | kind | status |
//! |------|--------|
//! | `NotFound` | 404 |
//! | `Validation`, `BadRequest` | 400 |
//! | `Unauthorized` | 401 |
//! | `Forbidden` | 403 |
//! | `Conflict` | 409 |
//! | `TooManyRequests` | 429 |
//! | `ServiceUnavailable` | 503 |
//! | `Internal`, `Custom(_)` | 500 |

use http::StatusCode;

use crate::types::ErrorKind;

/// Returns the HTTP status for `kind`. Host-defined kinds map to `500`.
///
/// # Examples
///
/// ```
/// use error_rail_http::{status::status_code, ErrorKind};
/// use http::StatusCode;
///
/// assert_eq!(status_code(&ErrorKind::NotFound), StatusCode::NOT_FOUND);
/// assert_eq!(status_code(&ErrorKind::custom("PAYMENT_DECLINED")), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
pub const fn status_code(kind: &ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal | ErrorKind::Custom(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps a raw wire code such as `"CONFLICT"` through the same table.
#[inline]
pub fn status_for_code(code: &str) -> StatusCode {
    status_code(&ErrorKind::from_code(code))
}
