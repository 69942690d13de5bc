//! Preview marker propagation.
//!
//! # Data Flow
//! ```text
//! inbound request (X-PREVIEW: v)
//!     → inbound.rs (PreviewLayer copies v into request extensions)
//!     → application handler
//!         → carry()/PreviewExt copies the marker onto an outbound request
//!     → outbound.rs (PreviewTransport appends X-PREVIEW: v)
//!     → hyper-util client → upstream
//! ```
//!
//! # Design Decisions
//! - The marker lives in `http::Extensions` under a crate-private newtype, so
//!   no other crate can read, forge or collide with it
//! - Empty header values are treated as absence; a stored marker is never empty
//! - Both layers are stateless and pass responses and errors through untouched

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, Extensions, HeaderName, HeaderValue, Request};
use std::convert::Infallible;

pub mod client;
pub mod inbound;
pub mod outbound;

pub use client::PreviewClient;
pub use inbound::{PreviewLayer, PreviewService};
pub use outbound::{CancelRequest, PreviewTransport, PreviewTransportLayer};

/// Header carrying the preview marker, both inbound and outbound.
pub const PREVIEW_HEADER: HeaderName = HeaderName::from_static("x-preview");

/// Extension key for the captured marker. Private on purpose: the type is the key.
#[derive(Clone, Debug)]
struct PreviewMarker(HeaderValue);

/// Read the preview marker stored in a request context.
pub fn marker(extensions: &Extensions) -> Option<&HeaderValue> {
    extensions.get::<PreviewMarker>().map(|m| &m.0)
}

/// Copy the preview marker (and nothing else) from one context to another.
///
/// Leaves `to` untouched when `from` carries no marker.
pub fn carry(from: &Extensions, to: &mut Extensions) {
    if let Some(m) = from.get::<PreviewMarker>() {
        to.insert(m.clone());
    }
}

/// Store `value` as the marker. Empty values are ignored.
pub(crate) fn insert(extensions: &mut Extensions, value: HeaderValue) -> bool {
    if value.is_empty() {
        return false;
    }
    extensions.insert(PreviewMarker(value));
    true
}

/// Convenience accessors on requests.
pub trait PreviewExt {
    /// The marker carried by this request's context, if any.
    fn preview(&self) -> Option<&HeaderValue>;

    /// Carry the marker of `inbound` over to this request.
    fn with_preview_from<B>(self, inbound: &Request<B>) -> Self;
}

impl<T> PreviewExt for Request<T> {
    fn preview(&self) -> Option<&HeaderValue> {
        marker(self.extensions())
    }

    fn with_preview_from<B>(mut self, inbound: &Request<B>) -> Self {
        carry(inbound.extensions(), self.extensions_mut());
        self
    }
}

/// Handler extractor for the preview marker.
///
/// Never rejects: a request without a marker yields `Preview(None)`.
#[derive(Clone, Debug, Default)]
pub struct Preview(Option<HeaderValue>);

impl Preview {
    /// The raw marker value.
    pub fn value(&self) -> Option<&HeaderValue> {
        self.0.as_ref()
    }

    /// The marker as text, or `""` when absent or not visible ASCII.
    pub fn as_str(&self) -> &str {
        self.0
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// Re-attach this marker to an outbound request's context.
    pub fn apply(&self, extensions: &mut Extensions) {
        if let Some(v) = &self.0 {
            insert(extensions, v.clone());
        }
    }
}

impl<S> FromRequestParts<S> for Preview
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Preview(marker(&parts.extensions).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Unrelated(&'static str);

    #[test]
    fn test_empty_value_is_not_stored() {
        let mut ext = Extensions::new();
        assert!(!insert(&mut ext, HeaderValue::from_static("")));
        assert!(marker(&ext).is_none());
    }

    #[test]
    fn test_plain_string_is_not_a_marker() {
        let mut ext = Extensions::new();
        ext.insert(String::from("100"));
        ext.insert(Unrelated("100"));
        assert!(marker(&ext).is_none());
    }

    #[test]
    fn test_carry_copies_only_the_marker() {
        let mut inbound = Extensions::new();
        insert(&mut inbound, HeaderValue::from_static("7"));
        inbound.insert(Unrelated("other"));

        let mut outbound = Extensions::new();
        carry(&inbound, &mut outbound);

        assert_eq!(marker(&outbound).unwrap(), "7");
        assert!(outbound.get::<Unrelated>().is_none());
    }

    #[test]
    fn test_carry_without_marker_leaves_target_alone() {
        let mut outbound = Extensions::new();
        outbound.insert(Unrelated("keep"));
        carry(&Extensions::new(), &mut outbound);

        assert!(marker(&outbound).is_none());
        assert_eq!(outbound.get::<Unrelated>().unwrap().0, "keep");
    }

    #[test]
    fn test_with_preview_from() {
        let mut inbound = Request::new(());
        insert(inbound.extensions_mut(), HeaderValue::from_static("42"));

        let outbound = Request::new(()).with_preview_from(&inbound);
        assert_eq!(outbound.preview().unwrap(), "42");
    }

    #[tokio::test]
    async fn test_extractor_never_rejects() {
        let (mut parts, _) = Request::new(()).into_parts();
        let preview = Preview::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(preview.as_str(), "");

        insert(&mut parts.extensions, HeaderValue::from_static("10"));
        let preview = Preview::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(preview.as_str(), "10");
    }

    #[test]
    fn test_apply_reattaches_marker() {
        let mut inbound = Extensions::new();
        insert(&mut inbound, HeaderValue::from_static("3"));
        let preview = Preview(marker(&inbound).cloned());

        let mut outbound = Extensions::new();
        preview.apply(&mut outbound);
        assert_eq!(marker(&outbound).unwrap(), "3");

        let mut untouched = Extensions::new();
        Preview::default().apply(&mut untouched);
        assert!(marker(&untouched).is_none());
    }
}
