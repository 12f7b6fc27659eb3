//! The canonical error value.
//!
//! An [`ErrorRecord`] is built once per failure, optionally enriched through
//! its builder methods, and then handed to the codec, which serializes it
//! into a failure envelope.
//!
//! - Kind, message and timestamp are fixed at construction
//! - Module and trace are captured from the call stack (best effort)
//! - Everything else is attached through consuming `with_*` builders

use core::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::trace::{self, BacktraceIntrospector, StackIntrospector, TraceConfig};
use crate::types::{ErrorKind, ErrorType, Priority, TraceVec};

/// Structured representation of one failure occurrence.
///
/// Serializes to the wire shape expected by clients:
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "user 42 not found",
///   "timestamp": 1718000000,
///   "human_readable_time": "2024-06-10 06:13:20",
///   "module": "users",
///   "trace": ["src/users.rs:12 api::users::get"],
///   "details": {"id": 42},
///   "request_id": "1718000000123456789"
/// }
/// ```
///
/// Optional fields are omitted when absent or empty.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(rename = "code")]
    kind: ErrorKind,
    message: String,
    timestamp: i64,
    #[serde(default, skip_serializing_if = "is_blank")]
    human_readable_time: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    module: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_trace")]
    trace: Option<TraceVec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(default, skip_serializing_if = "is_blank")]
    request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_type: Option<ErrorType>,
    #[serde(default, skip_serializing_if = "is_blank")]
    error_code: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    user_id: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn is_empty_trace(trace: &Option<TraceVec>) -> bool {
    trace.as_ref().map_or(true, |t| t.is_empty())
}

/// Layout of [`ErrorRecord::human_readable_time`], in local time.
pub const HUMAN_READABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn render_local_time(now: &DateTime<Local>) -> String {
    now.format(HUMAN_READABLE_TIME_FORMAT).to_string()
}

impl ErrorRecord {
    /// Creates a record, capturing the timestamp and the caller's call sites.
    ///
    /// An empty `message` is replaced by [`ErrorKind::default_message`].
    ///
    /// # Examples
    ///
    /// ```
    /// use error_rail_http::{ErrorKind, ErrorRecord};
    ///
    /// let err = ErrorRecord::new(ErrorKind::Conflict, "email already registered");
    /// assert_eq!(err.kind(), &ErrorKind::Conflict);
    /// assert_eq!(err.status_code(), 409);
    /// ```
    #[inline(never)]
    pub fn new<M: Into<String>>(kind: ErrorKind, message: M) -> Self {
        Self::new_with(kind, message, &BacktraceIntrospector, &TraceConfig::default())
    }

    /// Creates a record using an explicit introspector and trace configuration.
    pub fn new_with<M: Into<String>>(
        kind: ErrorKind,
        message: M,
        introspector: &dyn StackIntrospector,
        config: &TraceConfig,
    ) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = kind.default_message().to_owned();
        }

        let captured = trace::capture(introspector, config);
        let trace = if captured.trace.is_empty() { None } else { Some(captured.trace) };
        let now = Local::now();

        Self {
            kind,
            message,
            timestamp: now.timestamp(),
            human_readable_time: Some(render_local_time(&now)),
            module: Some(captured.module),
            trace,
            details: None,
            request_id: None,
            priority: None,
            error_type: None,
            error_code: None,
            user_id: None,
        }
    }

    /// Creates an [`ErrorKind::NotFound`] record.
    ///
    /// The shorthand constructors capture the caller's frames exactly like
    /// [`ErrorRecord::new`].
    ///
    /// ```
    /// use error_rail_http::ErrorRecord;
    ///
    /// let err = ErrorRecord::not_found("");
    /// assert_eq!(err.message(), "Not found");
    /// ```
    #[inline(never)]
    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates an [`ErrorKind::Validation`] record.
    #[inline(never)]
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Creates an [`ErrorKind::Internal`] record.
    #[inline(never)]
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Creates an [`ErrorKind::Unauthorized`] record.
    #[inline(never)]
    pub fn unauthorized<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Creates an [`ErrorKind::Forbidden`] record.
    #[inline(never)]
    pub fn forbidden<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Creates an [`ErrorKind::BadRequest`] record.
    #[inline(never)]
    pub fn bad_request<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Creates an [`ErrorKind::Conflict`] record.
    #[inline(never)]
    pub fn conflict<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Creates an [`ErrorKind::TooManyRequests`] record.
    #[inline(never)]
    pub fn too_many_requests<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::TooManyRequests, message)
    }

    /// Creates an [`ErrorKind::ServiceUnavailable`] record.
    #[inline(never)]
    pub fn service_unavailable<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Overrides the originating module.
    #[inline]
    pub fn with_module<S: Into<String>>(mut self, module: S) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Attaches an arbitrary payload.
    ///
    /// ```
    /// use error_rail_http::ErrorRecord;
    /// use serde_json::json;
    ///
    /// let err = ErrorRecord::validation("invalid input")
    ///     .with_details(json!({"field": "email"}));
    /// assert_eq!(err.details(), Some(&json!({"field": "email"})));
    /// ```
    #[inline]
    pub fn with_details<D: Into<Value>>(mut self, details: D) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Correlates the record with a request, see [`crate::context`].
    #[inline]
    pub fn with_request_id<S: Into<String>>(mut self, request_id: S) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Sets the urgency hint.
    #[inline]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Shorthand for `with_priority(Priority::Critical)`.
    #[inline]
    pub fn critical(self) -> Self {
        self.with_priority(Priority::Critical)
    }

    /// Marks who is responsible for the failure.
    #[inline]
    pub fn with_error_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }

    /// Shorthand for `with_error_type(ErrorType::User)`.
    #[inline]
    pub fn user_error(self) -> Self {
        self.with_error_type(ErrorType::User)
    }

    /// Shorthand for `with_error_type(ErrorType::System)`.
    #[inline]
    pub fn system_error(self) -> Self {
        self.with_error_type(ErrorType::System)
    }

    /// Attaches a secondary, application-specific code such as `"FS001"`.
    #[inline]
    pub fn with_error_code<S: Into<String>>(mut self, error_code: S) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    /// Records the acting user, or `"system"` for internal failures.
    #[inline]
    pub fn with_user_id<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Drops the captured call sites, e.g. before answering external clients.
    #[inline]
    pub fn without_trace(mut self) -> Self {
        self.trace = None;
        self
    }

    /// Failure class; drives the HTTP status.
    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Client-facing message. Never empty for constructed records.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Construction time in Unix seconds.
    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Construction time as local `YYYY-MM-DD HH:MM:SS`.
    ///
    /// Absent on records decoded from payloads that omit it.
    #[inline]
    pub fn human_readable_time(&self) -> Option<&str> {
        self.human_readable_time.as_deref()
    }

    /// Originating module, captured or set with [`ErrorRecord::with_module`].
    #[inline]
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Rendered `file:line function` call sites, innermost first.
    #[inline]
    pub fn trace(&self) -> Option<&[String]> {
        self.trace.as_deref()
    }

    /// Payload attached with [`ErrorRecord::with_details`].
    #[inline]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Request id attached with [`ErrorRecord::with_request_id`].
    #[inline]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Urgency hint, if any.
    #[inline]
    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// Responsibility marker, if any.
    #[inline]
    pub fn error_type(&self) -> Option<ErrorType> {
        self.error_type
    }

    /// Secondary application code, if any.
    #[inline]
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    /// Acting user, if any.
    #[inline]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// HTTP status derived from the kind.
    #[inline]
    pub fn status_code(&self) -> http::StatusCode {
        crate::status::status_code(&self.kind)
    }

    /// Short text form, `[<CODE>] <message>`.
    #[must_use]
    pub fn render_message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ErrorRecord {}
