//! Request logging middleware.
//!
//! Logs method, path, and key headers for every request except `/health`.
//! POST bodies are buffered for the log line and replayed into the handler;
//! GET responses are never buffered, which keeps the SSE event stream
//! flowing untouched.

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info};

const BODY_LOG_LIMIT: usize = 64 * 1024;

pub async fn log_requests(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if path == "/health" {
        return next.run(req).await;
    }

    let method = req.method().clone();
    let query = req.uri().query().map(str::to_string);
    let traceparent = req
        .headers()
        .get("traceparent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let req = if method == Method::POST {
        let (parts, body) = req.into_parts();
        let bytes = match to_bytes(body, BODY_LOG_LIMIT).await {
            Ok(b) => b,
            Err(_) => {
                return (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "request body too large",
                )
                    .into_response();
            }
        };
        debug!(
            method = %method,
            path = %path,
            body = %String::from_utf8_lossy(&bytes),
            "inbound request body"
        );
        Request::from_parts(parts, Body::from(bytes))
    } else {
        req
    };

    let response = next.run(req).await;
    info!(
        method = %method,
        path = %path,
        query = query.as_deref().unwrap_or(""),
        traceparent = traceparent.as_deref().unwrap_or(""),
        status = response.status().as_u16(),
        "request"
    );
    response
}
