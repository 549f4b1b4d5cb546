//! Discrete HTTP endpoints.
//!
//! These give non-MCP clients direct access to the catalogue and tool
//! invocation without a session. Tool calls go through the same
//! [`McpServer`](todo_gateway_mcp::McpServer) dispatch as the streaming
//! transport.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use todo_gateway_core::TraceContext;
use todo_gateway_mcp::McpError;

use crate::state::AppState;

/// Derive the trace context for an inbound request, continuing the caller's
/// trace when a `traceparent` header is present.
pub fn trace_from_headers(headers: &HeaderMap) -> TraceContext {
    headers
        .get("traceparent")
        .and_then(|v| v.to_str().ok())
        .and_then(TraceContext::from_traceparent)
        .unwrap_or_default()
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

/// GET /tools
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({"tools": state.registry.tools()}))
}

/// GET /capabilities
pub async fn capabilities(State(state): State<Arc<AppState>>) -> Json<Value> {
    let init = state.mcp.initialize_result();
    Json(json!({
        "protocolVersion": init.protocol_version,
        "capabilities": init.capabilities,
        "serverInfo": init.server_info,
    }))
}

/// GET /schema — the full catalogue in one response.
pub async fn schema(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "tools": state.registry.tools(),
        "resources": state.registry.resources(),
        "prompts": state.registry.prompts(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct InvokeBody {
    #[serde(default)]
    pub arguments: Value,
}

/// POST /tools/{name}/invoke
///
/// 200 with the call result envelope on any executed call (including tool
/// failures, which carry `isError`); 400 for a malformed body; 404 for an
/// unknown tool name.
pub async fn invoke_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Result<Json<InvokeBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("invalid request body: {rejection}")})),
            )
                .into_response();
        }
    };

    let ctx = trace_from_headers(&headers);
    match state.mcp.call_tool(&name, body.arguments, &ctx).await {
        Ok(result) => Json(result).into_response(),
        Err(McpError::ToolNotFound(name)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("unknown tool '{name}'")})),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}
