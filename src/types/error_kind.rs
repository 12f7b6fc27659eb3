//! Error kinds and their wire codes.
//!
//! [`ErrorKind`] is the tag that drives status-code mapping and client
//! messaging. The nine built-in kinds cover the common HTTP failure classes;
//! hosts can introduce their own through [`ErrorKind::Custom`].
//!
//! # Examples
//!
//! ```
//! use error_rail_http::ErrorKind;
//!
//! assert_eq!(ErrorKind::NotFound.as_code(), "NOT_FOUND");
//! assert_eq!(ErrorKind::from_code("CONFLICT"), ErrorKind::Conflict);
//! assert_eq!(ErrorKind::from_code("QUOTA_EXCEEDED").as_code(), "QUOTA_EXCEEDED");
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Class of failure carried by an [`ErrorRecord`](crate::ErrorRecord).
///
/// Serializes as its bare wire code (`"NOT_FOUND"`, `"VALIDATION_ERROR"`, ...).
/// Deserializing never fails on an unknown code; it yields [`ErrorKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Internal,
    Unauthorized,
    Forbidden,
    BadRequest,
    Conflict,
    /// Rate limited.
    TooManyRequests,
    ServiceUnavailable,
    /// Host-defined kind. Maps to `500` unless the host handles it itself.
    ///
    /// Build it through [`ErrorKind::custom`], which never yields an empty code.
    Custom(String),
}

impl ErrorKind {
    /// All built-in kinds, in declaration order.
    pub const BUILTIN: [ErrorKind; 9] = [
        ErrorKind::NotFound,
        ErrorKind::Validation,
        ErrorKind::Internal,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::BadRequest,
        ErrorKind::Conflict,
        ErrorKind::TooManyRequests,
        ErrorKind::ServiceUnavailable,
    ];

    /// Creates a host-defined kind.
    ///
    /// A code that matches a built-in kind resolves to that kind, so
    /// `ErrorKind::custom("NOT_FOUND") == ErrorKind::NotFound`. An empty code
    /// resolves to [`ErrorKind::Internal`], keeping the wire `code` non-empty.
    #[inline]
    pub fn custom<S: Into<String>>(code: S) -> Self {
        let code = code.into();
        match Self::builtin(&code) {
            Some(kind) => kind,
            None => Self::Custom(code),
        }
    }

    /// Parses a wire code. Unknown codes become [`ErrorKind::Custom`] and the
    /// empty code becomes [`ErrorKind::Internal`].
    #[inline]
    pub fn from_code(code: &str) -> Self {
        Self::builtin(code).unwrap_or_else(|| Self::Custom(code.to_owned()))
    }

    fn builtin(code: &str) -> Option<Self> {
        let kind = match code {
            "NOT_FOUND" => Self::NotFound,
            "VALIDATION_ERROR" => Self::Validation,
            "INTERNAL_ERROR" => Self::Internal,
            "UNAUTHORIZED" => Self::Unauthorized,
            "FORBIDDEN" => Self::Forbidden,
            "BAD_REQUEST" => Self::BadRequest,
            "CONFLICT" => Self::Conflict,
            "TOO_MANY_REQUESTS" => Self::TooManyRequests,
            "SERVICE_UNAVAILABLE" => Self::ServiceUnavailable,
            "" => Self::Internal,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns the wire code.
    #[inline]
    pub fn as_code(&self) -> &str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::BadRequest => "BAD_REQUEST",
            Self::Conflict => "CONFLICT",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::Custom(code) => code,
        }
    }

    /// Returns `true` for [`ErrorKind::Custom`].
    #[inline]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Message used when a record is created with an empty message.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::NotFound => "Not found",
            Self::Validation => "Validation failed",
            Self::Internal | Self::Custom(_) => "Internal server error",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::BadRequest => "Bad request",
            Self::Conflict => "Conflict",
            Self::TooManyRequests => "Too many requests",
            Self::ServiceUnavailable => "Service unavailable",
        }
    }

    /// HTTP status for this kind. See [`crate::status::status_code`].
    #[inline]
    pub fn status_code(&self) -> http::StatusCode {
        crate::status::status_code(self)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for ErrorKind {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_code(s))
    }
}

impl From<&str> for ErrorKind {
    #[inline]
    fn from(code: &str) -> Self {
        Self::from_code(code)
    }
}

impl From<String> for ErrorKind {
    #[inline]
    fn from(code: String) -> Self {
        Self::custom(code)
    }
}

impl Serialize for ErrorKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_code())
    }
}

impl<'de> Deserialize<'de> for ErrorKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        Ok(Self::custom(code))
    }
}

/// Urgency hint attached to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
    Critical,
}

/// Who is responsible for a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    /// Caused by the caller's input or permissions.
    User,
    /// Caused by the service or its dependencies.
    System,
}
