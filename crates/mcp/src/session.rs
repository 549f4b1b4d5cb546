//! Session lifecycle and ordered message delivery.
//!
//! Each connected client gets one [`Session`] holding the initialization
//! handshake state, and one worker task that pulls inbound messages off an
//! mpsc channel one at a time. Because the worker awaits each dispatch
//! before taking the next message, results always reach the outbound channel
//! in the order the calls arrived, whatever the backend latency per call.

use std::sync::Arc;

use serde_json::Value;
use todo_gateway_core::TraceContext;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::McpError;
use crate::server::McpServer;
use crate::types::{error_codes, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RpcId};

/// Where a session sits in the MCP handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport is open, no `initialize` seen yet.
    Connected,
    /// `initialize` answered, waiting for `notifications/initialized`.
    Initialized,
    /// Handshake complete, all methods available.
    Active,
    /// Transport gone, no message will be processed again.
    Closed,
}

/// One client's protocol session.
pub struct Session {
    id: Uuid,
    state: SessionState,
    server: Arc<McpServer>,
}

impl Session {
    pub fn new(server: Arc<McpServer>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Connected,
            server,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    /// Process one raw inbound message.
    ///
    /// Returns `None` for notifications, `Some` response for requests.
    /// The handshake sequence is enforced here: `initialize` is accepted
    /// only once, and every other request before it earns the
    /// not-initialized error code.
    pub async fn handle_message(
        &mut self,
        raw: &str,
        ctx: &TraceContext,
    ) -> Option<JsonRpcResponse> {
        if self.state == SessionState::Closed {
            warn!(session = %self.id, "message on closed session dropped");
            return None;
        }

        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    RpcId::Null,
                    error_codes::PARSE_ERROR,
                    McpError::JsonParse(e).to_string(),
                ));
            }
        };

        // A message with an id is a request; without one, a notification.
        if value.get("id").is_some() {
            let req: JsonRpcRequest = match serde_json::from_value(value) {
                Ok(r) => r,
                Err(e) => {
                    return Some(JsonRpcResponse::error(
                        RpcId::Null,
                        error_codes::INVALID_REQUEST,
                        format!("malformed request: {e}"),
                    ));
                }
            };
            Some(self.handle_request(req, ctx).await)
        } else {
            match serde_json::from_value::<JsonRpcNotification>(value) {
                Ok(note) => self.handle_notification(note),
                Err(e) => warn!(session = %self.id, error = %e, "malformed notification dropped"),
            }
            None
        }
    }

    async fn handle_request(&mut self, req: JsonRpcRequest, ctx: &TraceContext) -> JsonRpcResponse {
        match (req.method.as_str(), self.state) {
            ("initialize", SessionState::Connected) => {
                let resp = self.server.handle_request(req, ctx).await;
                self.state = SessionState::Initialized;
                info!(session = %self.id, "session initialized");
                resp
            }
            ("initialize", _) => JsonRpcResponse::error(
                req.id,
                error_codes::INVALID_REQUEST,
                "server already initialized",
            ),
            (_, SessionState::Connected) => {
                let err = McpError::NotInitialized;
                JsonRpcResponse::error(req.id, err.code(), err.to_string())
            }
            _ => self.server.handle_request(req, ctx).await,
        }
    }

    fn handle_notification(&mut self, note: JsonRpcNotification) {
        match note.method.as_str() {
            "notifications/initialized" => {
                if self.state == SessionState::Initialized {
                    self.state = SessionState::Active;
                    debug!(session = %self.id, "session active");
                } else {
                    warn!(session = %self.id, state = ?self.state, "unexpected initialized notification");
                }
            }
            other => debug!(session = %self.id, method = %other, "ignoring notification"),
        }
    }
}

/// One raw message queued for a session worker.
pub struct InboundMessage {
    pub raw: String,
    pub ctx: TraceContext,
}

/// Sender half for delivering messages into a running session.
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    inbound: mpsc::Sender<InboundMessage>,
}

impl SessionHandle {
    /// Queue a raw message for the session worker.
    ///
    /// Fails once the session has shut down.
    pub async fn deliver(&self, raw: String, ctx: TraceContext) -> Result<(), McpError> {
        self.inbound
            .send(InboundMessage { raw, ctx })
            .await
            .map_err(|_| McpError::SessionClosed)
    }
}

/// Spawn a session worker.
///
/// Responses go out on `outbound`; when its receiver is dropped (the client
/// disconnected) the worker closes the session and exits, discarding any
/// queued messages. The single-worker loop is what makes result delivery
/// strictly follow call arrival order.
pub fn spawn_session(
    server: Arc<McpServer>,
    outbound: mpsc::Sender<JsonRpcResponse>,
) -> SessionHandle {
    let mut session = Session::new(server);
    let id = session.id();
    let (tx, mut rx) = mpsc::channel::<InboundMessage>(64);

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Some(resp) = session.handle_message(&msg.raw, &msg.ctx).await {
                if outbound.send(resp).await.is_err() {
                    debug!(session = %session.id(), "client gone, closing session");
                    break;
                }
            }
        }
        session.close();
        info!(session = %id, "session worker stopped");
    });

    SessionHandle { id, inbound: tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use todo_gateway_backend::{BackendOutcome, Todo};
    use todo_gateway_runtime::testing::ScriptedBackend;
    use todo_gateway_runtime::tools::register_all;
    use todo_gateway_runtime::Registry;

    fn sample_todo(id: u32, title: &str) -> Todo {
        let now = chrono::Utc::now();
        Todo {
            id,
            title: title.to_string(),
            due_date: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    fn test_server() -> (Arc<McpServer>, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::new());
        let mut registry = Registry::new();
        register_all(&mut registry, backend.clone()).unwrap();
        (
            Arc::new(McpServer::new(Arc::new(registry), "todo-gateway", "0.1.0")),
            backend,
        )
    }

    fn init_msg(id: i64) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test-client"}
            }
        })
        .to_string()
    }

    fn call_msg(id: i64, tool: &str, arguments: Value) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": tool, "arguments": arguments}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_call_before_initialize_is_rejected() {
        let (server, _) = test_server();
        let mut session = Session::new(server);
        let ctx = TraceContext::new();
        let resp = session
            .handle_message(&call_msg(1, "hello", json!({})), &ctx)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::SERVER_NOT_INITIALIZED);
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_handshake_sequence() {
        let (server, backend) = test_server();
        backend.push_create(BackendOutcome::Success(sample_todo(1, "Buy milk")));
        let mut session = Session::new(server);
        let ctx = TraceContext::new();

        let resp = session.handle_message(&init_msg(1), &ctx).await.unwrap();
        assert!(resp.error.is_none());
        assert_eq!(session.state(), SessionState::Initialized);

        let note = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
        assert!(session.handle_message(&note, &ctx).await.is_none());
        assert_eq!(session.state(), SessionState::Active);

        let resp = session
            .handle_message(&call_msg(2, "todos-add", json!({"title": "Buy milk"})), &ctx)
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["content"][0]["value"], "Added todo: Buy milk");
    }

    #[tokio::test]
    async fn test_double_initialize_is_rejected() {
        let (server, _) = test_server();
        let mut session = Session::new(server);
        let ctx = TraceContext::new();
        session.handle_message(&init_msg(1), &ctx).await.unwrap();
        let resp = session.handle_message(&init_msg(2), &ctx).await.unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_parse_error_gets_null_id() {
        let (server, _) = test_server();
        let mut session = Session::new(server);
        let ctx = TraceContext::new();
        let resp = session.handle_message("{not json", &ctx).await.unwrap();
        assert_eq!(resp.id, RpcId::Null);
        assert_eq!(resp.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_closed_session_drops_messages() {
        let (server, _) = test_server();
        let mut session = Session::new(server);
        session.close();
        let ctx = TraceContext::new();
        assert!(session.handle_message(&init_msg(1), &ctx).await.is_none());
    }

    #[tokio::test]
    async fn test_worker_preserves_call_order_under_latency() {
        let (server, backend) = test_server();
        // First call is slow, second is fast; responses must still come
        // back in arrival order.
        backend.push_delay(Duration::from_millis(50));
        backend.push_delay(Duration::from_millis(0));
        backend.push_create(BackendOutcome::Success(sample_todo(1, "slow")));
        backend.push_create(BackendOutcome::Success(sample_todo(2, "fast")));

        let (out_tx, mut out_rx) = mpsc::channel(8);
        let handle = spawn_session(server, out_tx);
        let ctx = TraceContext::new();

        handle.deliver(init_msg(1), ctx.clone()).await.unwrap();
        let note = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
        handle.deliver(note, ctx.clone()).await.unwrap();
        handle
            .deliver(call_msg(2, "todos-add", json!({"title": "slow"})), ctx.clone())
            .await
            .unwrap();
        handle
            .deliver(call_msg(3, "todos-add", json!({"title": "fast"})), ctx)
            .await
            .unwrap();

        assert_eq!(out_rx.recv().await.unwrap().id, RpcId::Number(1));
        let first = out_rx.recv().await.unwrap();
        assert_eq!(first.id, RpcId::Number(2));
        assert_eq!(
            first.result.unwrap()["content"][0]["value"],
            "Added todo: slow"
        );
        let second = out_rx.recv().await.unwrap();
        assert_eq!(second.id, RpcId::Number(3));
    }

    #[tokio::test]
    async fn test_worker_stops_when_client_disconnects() {
        let (server, _) = test_server();
        let (out_tx, out_rx) = mpsc::channel(8);
        let handle = spawn_session(server, out_tx);
        drop(out_rx);
        let ctx = TraceContext::new();
        // The first delivery may still land in the queue; once the worker
        // notices the dead outbound side it exits and delivery fails.
        let _ = handle.deliver(init_msg(1), ctx.clone()).await;
        for _ in 0..100 {
            if handle.deliver(init_msg(2), ctx.clone()).await.is_err() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("session worker never shut down");
    }
}
