//! Tower integration for error-rail-http.
//!
//! This module provides the two request-boundary middlewares as Tower
//! `Layer`/`Service` pairs over `http::Request` and `http::Response`:
//!
//! - [`RecoveryLayer`] contains panics raised by the inner service, both while
//!   it is called and while its future is polled, and answers with an
//!   `INTERNAL_ERROR` envelope.
//! - [`RequestIdLayer`] stores a fresh request id in the request's
//!   [`RequestContext`] extension and echoes it in the `x-request-id`
//!   response header.
//!
//! # Feature Flag
//!
//! Requires the `tower` feature (enabled by default).
//!
//! # Example
//!
//! ```rust,ignore
//! use error_rail_http::tower::{RecoveryLayer, RequestIdLayer};
//! use tower::ServiceBuilder;
//!
//! let service = ServiceBuilder::new()
//!     .layer(RequestIdLayer::new())
//!     .layer(RecoveryLayer::new())
//!     .service(my_service);
//! ```
//!
//! Placing [`RequestIdLayer`] outside [`RecoveryLayer`] lets recovered panic
//! records carry the request id.

use core::any::Any;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::panic::{catch_unwind, AssertUnwindSafe};

use futures_core::future::FusedFuture;
use http::header::{HeaderName, HeaderValue};
use http::{Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};

use crate::context::{generate_request_id, RequestContext, RequestContextExt, REQUEST_ID_HEADER, REQUEST_ID_KEY};
use crate::recovery::respond_to_panic;

/// A Tower [`Layer`] that turns panics of the wrapped service into error responses.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecoveryLayer;

impl RecoveryLayer {
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RecoveryLayer {
    type Service = RecoveryService<S>;

    #[inline]
    fn layer(&self, inner: S) -> Self::Service {
        RecoveryService::new(inner)
    }
}

/// A Tower [`Service`] that contains panics of its inner service.
///
/// Normal responses and errors of the inner service pass through untouched.
#[derive(Clone, Debug)]
pub struct RecoveryService<S> {
    inner: S,
}

impl<S> RecoveryService<S> {
    #[inline]
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Returns a reference to the inner service.
    #[inline]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner service.
    #[inline]
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consumes the wrapper and returns the inner service.
    #[inline]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RecoveryService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: From<Vec<u8>>,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = RecoveryFuture<S::Future, ResBody>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let request_id = Some(request.request_id()).filter(|id| !id.is_empty()).map(str::to_owned);
        let inner = &mut self.inner;

        match catch_unwind(AssertUnwindSafe(|| inner.call(request))) {
            Ok(future) => RecoveryFuture::running(future, request_id),
            Err(payload) => RecoveryFuture::recovered(panic_response(&*payload, request_id.as_deref())),
        }
    }
}

fn panic_response<B>(payload: &(dyn Any + Send), request_id: Option<&str>) -> Response<B>
where
    B: From<Vec<u8>>,
{
    let mut response = Response::new(Vec::new());
    respond_to_panic(&mut response, payload, request_id);
    response.map(B::from)
}

pin_project! {
    /// Future returned by [`RecoveryService`].
    ///
    /// Every poll of the inner future runs under `catch_unwind`.
    #[must_use = "futures do nothing unless polled"]
    pub struct RecoveryFuture<F, B> {
        #[pin]
        inner: Option<F>,
        request_id: Option<String>,
        recovered: Option<Response<B>>,
    }
}

impl<F, B> RecoveryFuture<F, B> {
    #[inline]
    fn running(inner: F, request_id: Option<String>) -> Self {
        Self { inner: Some(inner), request_id, recovered: None }
    }

    #[inline]
    fn recovered(response: Response<B>) -> Self {
        Self { inner: None, request_id: None, recovered: Some(response) }
    }
}

impl<F, B, E> Future for RecoveryFuture<F, B>
where
    F: Future<Output = Result<Response<B>, E>>,
    B: From<Vec<u8>>,
{
    type Output = Result<Response<B>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        if let Some(response) = this.recovered.take() {
            return Poll::Ready(Ok(response));
        }

        // `inner` stays `Some` until the output (or a recovered panic) is returned.
        let inner = this.inner.as_mut().as_pin_mut().expect("polled after completion");

        match catch_unwind(AssertUnwindSafe(|| inner.poll(cx))) {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(output)) => {
                this.inner.set(None);
                Poll::Ready(output)
            },
            Err(payload) => {
                this.inner.set(None);
                Poll::Ready(Ok(panic_response(&*payload, this.request_id.as_deref())))
            },
        }
    }
}

impl<F, B, E> FusedFuture for RecoveryFuture<F, B>
where
    F: Future<Output = Result<Response<B>, E>>,
    B: From<Vec<u8>>,
{
    #[inline]
    fn is_terminated(&self) -> bool {
        self.inner.is_none() && self.recovered.is_none()
    }
}

/// A Tower [`Layer`] that assigns every request a fresh request id.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    #[inline]
    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService::new(inner)
    }
}

/// A Tower [`Service`] that stores a request id in the [`RequestContext`]
/// extension before calling its inner service.
#[derive(Clone, Debug)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> RequestIdService<S> {
    #[inline]
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    #[inline]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    #[inline]
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    #[inline]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = RequestIdFuture<S::Future>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let request_id = generate_request_id();

        #[cfg(feature = "tracing")]
        tracing::debug!(request_id = %request_id, method = %request.method(), uri = %request.uri(), "assigned request id");

        let header = HeaderValue::from_str(&request_id).ok();
        let extensions = request.extensions_mut();
        match extensions.get_mut::<RequestContext>() {
            Some(ctx) => ctx.insert(REQUEST_ID_KEY, request_id),
            None => {
                extensions.insert(RequestContext::new().with_value(REQUEST_ID_KEY, request_id));
            },
        }

        RequestIdFuture { inner: self.inner.call(request), header }
    }
}

pin_project! {
    /// Future returned by [`RequestIdService`].
    ///
    /// Adds the `x-request-id` header to successful responses that lack one.
    #[must_use = "futures do nothing unless polled"]
    pub struct RequestIdFuture<F> {
        #[pin]
        inner: F,
        header: Option<HeaderValue>,
    }
}

impl<F, B, E> Future for RequestIdFuture<F>
where
    F: Future<Output = Result<Response<B>, E>>,
{
    type Output = Result<Response<B>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.inner.poll(cx) {
            Poll::Ready(Ok(mut response)) => {
                if let Some(value) = this.header.take() {
                    response.headers_mut().entry(HeaderName::from_static(REQUEST_ID_HEADER)).or_insert(value);
                }
                Poll::Ready(Ok(response))
            },
            Poll::Ready(Err(error)) => Poll::Ready(Err(error)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Extension trait for wrapping services with the request-boundary middlewares.
pub trait ServiceBoundaryExt<Req>: Service<Req> + Sized {
    /// Wraps this service so that its panics become error responses.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use error_rail_http::tower::ServiceBoundaryExt;
    ///
    /// let service = my_service.with_panic_recovery().with_request_id();
    /// ```
    fn with_panic_recovery(self) -> RecoveryService<Self> {
        RecoveryService::new(self)
    }

    /// Wraps this service so that every request carries a request id.
    fn with_request_id(self) -> RequestIdService<Self> {
        RequestIdService::new(self)
    }
}

impl<S, Req> ServiceBoundaryExt<Req> for S where S: Service<Req> {}
