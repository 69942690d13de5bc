//! Preview marker propagation for HTTP services.
//!
//! An inbound `X-PREVIEW` header is captured into the request context by
//! [`PreviewLayer`] and re-sent on outbound requests by [`PreviewTransport`]
//! whenever the caller carries that context over.

pub mod config;
pub mod http;
pub mod observability;
pub mod preview;

pub use config::PreviewConfig;
pub use http::HttpServer;
pub use preview::{
    carry, marker, CancelRequest, Preview, PreviewClient, PreviewExt, PreviewLayer,
    PreviewTransport, PREVIEW_HEADER,
};
