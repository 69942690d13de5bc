//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the demo handlers
//! - Wire up middleware (preview capture, tracing, timeout)
//! - Forward requests to the configured upstream with the preview marker
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::PreviewConfig;
use crate::preview::{carry, Preview, PreviewClient, PreviewLayer, PREVIEW_HEADER};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: PreviewClient,
    pub upstream: Option<Arc<str>>,
}

/// HTTP server exposing the preview demo endpoints.
pub struct HttpServer {
    router: Router,
    config: PreviewConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: PreviewConfig) -> Self {
        let state = AppState {
            client: PreviewClient::new(&config.client),
            upstream: config
                .upstream
                .base_url
                .as_deref()
                .map(|url| Arc::from(url.trim_end_matches('/'))),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &PreviewConfig, state: AppState) -> Router {
        Router::new()
            .route("/echo", get(echo_handler))
            .route("/marker", get(marker_handler))
            .route("/forward", any(forward_handler))
            .route("/forward/{*path}", any(forward_handler))
            .with_state(state)
            .layer(PreviewLayer::new())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run the server until `shutdown` completes.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = ?self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Echo the first `X-PREVIEW` header value received, or nothing.
async fn echo_handler(headers: HeaderMap) -> Vec<u8> {
    headers
        .get(PREVIEW_HEADER)
        .map(|v| v.as_bytes().to_vec())
        .unwrap_or_default()
}

/// Return the marker found in the request context, or nothing.
async fn marker_handler(preview: Preview) -> Vec<u8> {
    preview
        .value()
        .map(|v| v.as_bytes().to_vec())
        .unwrap_or_default()
}

/// Headers never copied onto the forwarded request. `x-preview` is re-added
/// from the request context by the client.
static SKIPPED_HEADERS: [HeaderName; 10] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::HOST,
    PREVIEW_HEADER,
];

/// Copy end-to-end headers of the inbound request for forwarding.
fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if !SKIPPED_HEADERS.contains(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Forward the request to the upstream, carrying the inbound marker.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let Some(base) = state.upstream.as_deref() else {
        return (StatusCode::NOT_FOUND, "No upstream configured").into_response();
    };

    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let rest = path_and_query.strip_prefix("/forward").unwrap_or(path_and_query);
    let rest = if rest.is_empty() { "/" } else { rest };

    let uri = match format!("{}{}", base, rest).parse::<Uri>() {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(error = %e, path = %path_and_query, "Invalid forward target");
            return (StatusCode::BAD_REQUEST, "Invalid forward target").into_response();
        }
    };

    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method.clone();
    *outbound.uri_mut() = uri;
    *outbound.headers_mut() = forwarded_headers(&parts.headers);
    carry(&parts.extensions, outbound.extensions_mut());

    tracing::debug!(method = %parts.method, uri = %outbound.uri(), "Forwarding request");

    match state.client.send(outbound).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
