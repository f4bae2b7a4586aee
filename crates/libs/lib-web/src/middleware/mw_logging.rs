//! # Request/Response Logging Middleware
//!
//! Structured request/response logging with request-ID correlation.
//!
//! Every request gets one completion line with method, path, status, and
//! latency. Client errors log at `warn`, server errors at `error`, so a
//! misbehaving client and a broken store are distinguishable at a glance.
//! Message bodies are never logged; chat text stays out of the logs.

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, warn};

/// Request/response logging middleware.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    // Correlate with the stamp added by mw_req_stamp.
    let request_id = req
        .extensions()
        .get::<crate::middleware::mw_req_stamp::RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let res = next.run(req).await;

    let status = res.status();
    let latency_ms = start.elapsed().as_millis();

    if status.is_server_error() {
        error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status,
            latency_ms,
            "Request failed"
        );
    } else if status.is_client_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status,
            latency_ms,
            "Request rejected"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status,
            latency_ms,
            "Request completed"
        );
    }

    res
}
