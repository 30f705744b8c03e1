//! Request spans.
//!
//! Every request runs inside an `http.request` span carrying method, path and
//! request id, so handler events are correlated without passing ids around.

use axum::{body::Body, http::Request};
use tracing::Span;

use crate::http::request::request_id;

/// Span factory for `TraceLayer::make_span_with`.
pub fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http.request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request),
    )
}
