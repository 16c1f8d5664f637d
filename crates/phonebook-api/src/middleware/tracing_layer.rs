//! # Request/Response Tracing
//!
//! Configures `tower_http::trace::TraceLayer` so each request runs inside
//! an `info` span carrying method and path, with status and latency logged
//! on completion. Query strings stay out of the span.

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::Level;

/// Build the `TraceLayer` for the phonebook API.
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, PathSpan> {
    TraceLayer::new_for_http()
        .make_span_with(PathSpan)
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// Span maker recording method and path only.
#[derive(Debug, Clone, Copy)]
pub struct PathSpan;

impl<B> MakeSpan<B> for PathSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> tracing::Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
        )
    }
}
