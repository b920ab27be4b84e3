use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Whether a response body is an SSE stream
pub fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/event-stream"))
}

/// Request logging middleware
///
/// A news stream is logged when its headers go out; the events that follow
/// are logged by the emitters under their `stream_id`.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let elapsed_ms = start.elapsed().as_millis();
    let status = response.status();

    if is_event_stream(response.headers()) {
        tracing::info!(
            method = %method,
            uri = %uri,
            status = %status,
            time_to_headers_ms = %elapsed_ms,
            "News stream opened"
        );
    } else {
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info!(
            method = %method,
            uri = %uri,
            status = %status,
            content_type,
            duration_ms = %elapsed_ms,
            "Request processed"
        );
    }

    response
}
