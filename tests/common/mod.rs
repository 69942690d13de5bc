//! Shared utilities for integration tests.

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use axum::body::Body;
use axum::http::Response;
use axum::Router;
use preview_propagation::{HttpServer, PreviewConfig};

/// Handle to a running server; dropping it stops the server.
pub struct TestServer {
    pub addr: SocketAddr,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the demo server on an ephemeral local port.
pub async fn start_server(mut config: PreviewConfig) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".into();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server
            .run_until(listener, async move {
                let _ = rx.await;
            })
            .await;
    });

    TestServer {
        addr,
        _shutdown: tx,
    }
}

/// Serve an arbitrary router on an ephemeral local port.
#[allow(dead_code)]
pub async fn start_router(router: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    TestServer {
        addr,
        _shutdown: tx,
    }
}

/// Start a server whose `/forward` goes to `upstream`.
#[allow(dead_code)]
pub async fn start_forwarding_server(upstream: &TestServer) -> TestServer {
    let mut config = PreviewConfig::default();
    config.upstream.base_url = Some(upstream.url(""));
    start_server(config).await
}

/// Collect a hyper response body into a string.
#[allow(dead_code)]
pub async fn body_string<B>(response: Response<B>) -> String
where
    B: axum::body::HttpBody<Data = axum::body::Bytes> + Send + 'static,
    B::Error: Into<axum::BoxError>,
{
    let bytes = axum::body::to_bytes(Body::new(response.into_body()), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
