//! Client factory with the preview injector installed.

use axum::http::Request;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use std::time::Duration;
use tower::{Service, ServiceExt};

use super::outbound::{DefaultTransport, PreviewTransport};
use crate::config::ClientConfig;

/// HTTP client whose transport forwards the preview marker.
///
/// The marker is read from each request's own extensions when it is sent,
/// so one client can be shared by all handlers.
#[derive(Clone, Debug)]
pub struct PreviewClient<T = DefaultTransport> {
    transport: PreviewTransport<T>,
}

impl PreviewClient<DefaultTransport> {
    /// Build the standard transport from `config` and install the injector on it.
    pub fn new(config: &ClientConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .http2_only(config.http2_only)
            .build(connector);

        Self::with_transport(client)
    }
}

impl Default for PreviewClient<DefaultTransport> {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl<T> PreviewClient<T> {
    /// Install the injector on top of an existing transport.
    pub fn with_transport(base: T) -> Self {
        Self {
            transport: PreviewTransport::new(base),
        }
    }

    pub fn transport(&self) -> &PreviewTransport<T> {
        &self.transport
    }

    /// Send `req`, injecting the marker found in its extensions.
    pub async fn send<B>(
        &self,
        req: Request<B>,
    ) -> Result<<T as Service<Request<B>>>::Response, <T as Service<Request<B>>>::Error>
    where
        T: Service<Request<B>> + Clone,
    {
        self.transport.clone().oneshot(req).await
    }

    /// Like [`send`](Self::send), but leaves the caller's request untouched.
    pub async fn send_ref<B>(
        &self,
        req: &Request<B>,
    ) -> Result<<T as Service<Request<B>>>::Response, <T as Service<Request<B>>>::Error>
    where
        T: Service<Request<B>> + Clone,
        B: Clone,
    {
        self.send(req.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::{insert, PREVIEW_HEADER};
    use axum::http::{HeaderMap, HeaderValue};
    use std::convert::Infallible;
    use tower::service_fn;

    fn recording_client(
    ) -> PreviewClient<impl Service<Request<()>, Response = HeaderMap, Error = Infallible> + Clone>
    {
        PreviewClient::with_transport(service_fn(|req: Request<()>| async move {
            Ok::<_, Infallible>(req.headers().clone())
        }))
    }

    #[tokio::test]
    async fn test_send_ref_keeps_original() {
        let client = recording_client();
        let mut req = Request::builder()
            .uri("http://upstream.local/items")
            .header(PREVIEW_HEADER, "manual")
            .body(())
            .unwrap();
        insert(req.extensions_mut(), HeaderValue::from_static("100"));

        let sent = client.send_ref(&req).await.unwrap();

        assert_eq!(sent.get_all(PREVIEW_HEADER).iter().count(), 2);
        assert_eq!(req.headers().get_all(PREVIEW_HEADER).iter().count(), 1);
        assert_eq!(req.headers().get(PREVIEW_HEADER).unwrap(), "manual");
    }

    #[tokio::test]
    async fn test_marker_read_at_send_time() {
        let client = recording_client();

        let plain = client.send(Request::new(())).await.unwrap();
        assert!(plain.get(PREVIEW_HEADER).is_none());

        let mut req = Request::new(());
        insert(req.extensions_mut(), HeaderValue::from_static("9"));
        let marked = client.send(req).await.unwrap();
        assert_eq!(marked.get(PREVIEW_HEADER).unwrap(), "9");
    }

    #[tokio::test]
    async fn test_default_client_reports_transport_error() {
        let client = PreviewClient::default();
        let mut req = Request::get("http://127.0.0.1:1/")
            .body(axum::body::Body::empty())
            .unwrap();
        insert(req.extensions_mut(), HeaderValue::from_static("1"));

        let err = client.send(req).await.unwrap_err();
        assert!(err.is_connect());
    }
}
