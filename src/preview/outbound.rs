//! Outbound side: inject the preview marker into client requests.
//!
//! # Responsibilities
//! - Wrap a client transport (any `tower::Service<Request<B>>`)
//! - Append `X-PREVIEW` to the outgoing request when its context carries a marker
//! - Forward readiness, responses, errors and cancellation to the base transport
//!
//! # Design Decisions
//! - The request is moved into the call, so the caller's copy is never mutated
//! - Injection is additive: values already set on the request are kept
//! - No marker means no change at all to the request sent

use axum::body::Body;
use axum::http::Request;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use super::{marker, PREVIEW_HEADER};

/// Standard transport used when no base transport is supplied.
pub type DefaultTransport = Client<HttpConnector, Body>;

/// Optional capability: abort an in-flight request.
///
/// Async transports cancel by dropping the response future; this trait is for
/// transports that also expose an explicit cancel operation.
pub trait CancelRequest<R> {
    fn cancel_request(&self, request: &R);
}

/// Layer that applies [`PreviewTransport`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PreviewTransportLayer;

impl<T> Layer<T> for PreviewTransportLayer {
    type Service = PreviewTransport<T>;

    fn layer(&self, base: T) -> Self::Service {
        PreviewTransport::new(base)
    }
}

/// Transport decorator appending the preview marker to outgoing requests.
#[derive(Clone, Debug)]
pub struct PreviewTransport<T = DefaultTransport> {
    base: T,
}

impl<T> PreviewTransport<T> {
    /// Wrap an existing transport, keeping its configuration.
    pub fn new(base: T) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &T {
        &self.base
    }

    pub fn into_base(self) -> T {
        self.base
    }
}

impl Default for PreviewTransport<DefaultTransport> {
    fn default() -> Self {
        Self::new(Client::builder(TokioExecutor::new()).build(HttpConnector::new()))
    }
}

impl<T, B> Service<Request<B>> for PreviewTransport<T>
where
    T: Service<Request<B>>,
{
    type Response = T::Response;
    type Error = T::Error;
    type Future = T::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.base.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        if let Some(value) = marker(req.extensions()).cloned() {
            tracing::trace!(preview = ?value, uri = %req.uri(), "Injecting preview marker");
            req.headers_mut().append(PREVIEW_HEADER, value);
        }
        self.base.call(req)
    }
}

impl<T, R> CancelRequest<R> for PreviewTransport<T>
where
    T: CancelRequest<R>,
{
    fn cancel_request(&self, request: &R) {
        self.base.cancel_request(request);
    }
}
