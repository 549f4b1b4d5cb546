//! SSE transport for the streaming protocol.
//!
//! `GET /sse` opens the event stream: first an `endpoint` event telling the
//! client where to POST, then one `message` event per JSON-RPC response.
//! `POST /sse?sessionId=…` feeds a raw message into that session's queue.
//! Dropping the GET stream tears the session down; in-flight results are
//! discarded by the session worker once its outbound channel is gone.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::json;
use todo_gateway_mcp::{spawn_session, JsonRpcResponse};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::trace_from_headers;
use crate::state::AppState;

const OUTBOUND_BUFFER: usize = 64;

/// Removes the session from the shared map when the event stream drops.
struct SessionGuard {
    id: Uuid,
    state: Arc<AppState>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let state = self.state.clone();
        let id = self.id;
        tokio::spawn(async move {
            state.sessions.write().await.remove(&id);
            info!(session = %id, "sse stream closed, session removed");
        });
    }
}

fn sse_frame(event: &str, data: &str) -> Bytes {
    Bytes::from(format!("event: {event}\ndata: {data}\n\n"))
}

/// GET /sse
pub async fn connect(State(state): State<Arc<AppState>>) -> Response {
    let (out_tx, out_rx) = mpsc::channel::<JsonRpcResponse>(OUTBOUND_BUFFER);
    let handle = spawn_session(state.mcp.clone(), out_tx);
    let id = handle.id;
    state.sessions.write().await.insert(id, handle);
    info!(session = %id, "sse session opened");

    let guard = SessionGuard {
        id,
        state: state.clone(),
    };
    let endpoint = format!("/sse?sessionId={id}");

    let opening = stream::once(async move {
        Ok::<Bytes, Infallible>(sse_frame("endpoint", &endpoint))
    });
    // The guard rides along in the unfold state so it drops exactly when
    // the client stops reading.
    let messages = stream::unfold((out_rx, guard), |(mut rx, guard)| async move {
        let resp = rx.recv().await?;
        let frame = match serde_json::to_string(&resp) {
            Ok(data) => sse_frame("message", &data),
            Err(e) => {
                warn!(error = %e, "dropping unserializable response");
                Bytes::new()
            }
        };
        Some((Ok::<Bytes, Infallible>(frame), (rx, guard)))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(opening.chain(messages)))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[derive(Debug, Deserialize)]
pub struct SseQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
}

/// POST /sse?sessionId=…
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SseQuery>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let handle = { state.sessions.read().await.get(&query.session_id).cloned() };
    let Some(handle) = handle else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("unknown session '{}'", query.session_id)})),
        )
            .into_response();
    };

    let ctx = trace_from_headers(&headers);
    debug!(session = %query.session_id, trace = %ctx, "queueing sse message");
    match handle.deliver(body, ctx).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(_) => {
            // Worker already shut down; drop the stale entry.
            state.sessions.write().await.remove(&query.session_id);
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": format!("session '{}' is closed", query.session_id)})),
            )
                .into_response()
        }
    }
}
