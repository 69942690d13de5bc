//! Inbound side: capture the preview header into the request context.
//!
//! # Responsibilities
//! - Read the first `X-PREVIEW` value of every incoming request
//! - Store it under the private marker key when non-empty
//! - Delegate to the wrapped service without touching the response
//!
//! # Design Decisions
//! - Requests without the header are forwarded as-is
//! - The wrapped service's future is returned directly, so readiness,
//!   responses and errors are exactly those of the inner service

use axum::http::Request;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use super::{insert, PREVIEW_HEADER};

/// Layer that applies [`PreviewService`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PreviewLayer;

impl PreviewLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for PreviewLayer {
    type Service = PreviewService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PreviewService { inner }
    }
}

/// Middleware copying the `X-PREVIEW` header into request extensions.
#[derive(Clone, Debug)]
pub struct PreviewService<S> {
    inner: S,
}

impl<S> PreviewService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, B> Service<Request<B>> for PreviewService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let value = req
            .headers()
            .get(PREVIEW_HEADER)
            .filter(|v| !v.is_empty())
            .cloned();

        if let Some(value) = value {
            tracing::trace!(preview = ?value, "Captured preview marker");
            insert(req.extensions_mut(), value);
        }

        self.inner.call(req)
    }
}
