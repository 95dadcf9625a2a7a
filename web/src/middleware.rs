//! Request tagging and tracing.
//!
//! Every request gets an `x-request-id` (kept if the client sent one, a fresh UUID
//! otherwise). The id is stored in the request extensions as [`RequestId`], recorded
//! on the request's tracing span and echoed on the response, including responses for
//! unmatched routes and static files.

use axum::{Router, extract::Request};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

pub use tower_http::request_id::RequestId;

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Span for one request, carrying its id.
fn request_span(request: &Request) -> Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        "http_request",
        request_id,
        method = %request.method(),
        uri = %request.uri(),
    )
}

/// Wrap `router` so every request is tagged with a [`RequestId`] and traced.
#[must_use]
pub fn with_request_tracing<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(PropagateRequestIdLayer::x_request_id()),
    )
}
