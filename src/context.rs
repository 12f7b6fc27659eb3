//! Request-scoped context and request ids.
//!
//! Rust has no ambient per-request storage, so handlers receive a
//! [`RequestContext`] explicitly. The context is a small string-keyed map of
//! type-erased values; it is cheap to clone, which also lets it travel in
//! `http::Extensions` (see the `tower` module).
//!
//! # Examples
//!
//! ```
//! use error_rail_http::context::{get_request_id, with_request_id, RequestContext};
//!
//! let root = RequestContext::new();
//! let id = with_request_id(&root, |ctx| get_request_id(ctx).to_owned());
//!
//! assert!(id.len() >= 10);
//! assert_eq!(get_request_id(&root), "");
//! ```

use core::any::Any;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Key under which the request id is stored.
pub const REQUEST_ID_KEY: &str = "request_id";

/// Header used to echo the request id back to clients.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request-scoped values keyed by name.
#[derive(Clone, Default)]
pub struct RequestContext {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl RequestContext {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this context with `key` set to `value`.
    ///
    /// The receiver is left unchanged.
    #[must_use]
    pub fn with_value<K, V>(&self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Any + Send + Sync,
    {
        let mut derived = self.clone();
        derived.insert(key, value);
        derived
    }

    /// Sets `key` to `value` in place, replacing any previous value.
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Any + Send + Sync,
    {
        self.values.insert(key.into(), Arc::new(value));
    }

    /// Returns the value under `key` if it exists and has type `V`.
    pub fn value<V: Any>(&self, key: &str) -> Option<&V> {
        self.values.get(key).and_then(|value| value.downcast_ref::<V>())
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Shorthand for [`get_request_id`].
    #[inline]
    pub fn request_id(&self) -> &str {
        get_request_id(self)
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("RequestContext").field("keys", &keys).finish()
    }
}

/// Access to the [`RequestContext`] stored in `http` request extensions.
pub trait RequestContextExt {
    fn request_context(&self) -> Option<&RequestContext>;

    /// Request id of the stored context, or `""`.
    fn request_id(&self) -> &str {
        self.request_context().map_or("", get_request_id)
    }
}

impl<B> RequestContextExt for http::Request<B> {
    #[inline]
    fn request_context(&self) -> Option<&RequestContext> {
        self.extensions().get::<RequestContext>()
    }
}

/// Reads the request id, or `""` when it is missing or not a `String`.
pub fn get_request_id(ctx: &RequestContext) -> &str {
    ctx.value::<String>(REQUEST_ID_KEY).map_or("", String::as_str)
}

/// Generates a request id from the current time in nanoseconds.
///
/// Ids are distinct in practice but not guaranteed unique across
/// concurrent requests.
pub fn generate_request_id() -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_nanos());
    nanos.to_string()
}

/// Runs `handler` with a child of `ctx` that carries a fresh request id.
pub fn with_request_id<F, R>(ctx: &RequestContext, handler: F) -> R
where
    F: FnOnce(&RequestContext) -> R,
{
    let request_id = generate_request_id();

    #[cfg(feature = "tracing")]
    tracing::debug!(request_id = %request_id, "assigned request id");

    let ctx = ctx.with_value(REQUEST_ID_KEY, request_id);
    handler(&ctx)
}
