//! Protocol dispatch.
//!
//! [`McpServer`] maps JSON-RPC methods onto registry lookups and handler
//! invocations. It is stateless; the initialization handshake and per-session
//! ordering live in [`crate::session`]. The same `call_tool`, `read_resource`
//! and `get_prompt` methods back both the MCP transport and the discrete
//! HTTP endpoints, so one tool invocation path serves every surface.

use std::sync::Arc;

use serde_json::{json, Value};
use todo_gateway_core::TraceContext;
use todo_gateway_runtime::{resource, CallResult, GetPromptResult, ReadResult, Registry};
use tracing::{debug, info};

use crate::error::McpError;
use crate::types::{
    CallToolParams, GetPromptParams, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ListPromptsResult, ListResourcesResult, ListToolsResult, PromptsCapability, ReadResourceParams,
    ResourcesCapability, ServerCapabilities, ServerInfo, ToolsCapability, PROTOCOL_VERSION,
};

/// Dispatches MCP requests against a tool registry.
pub struct McpServer {
    registry: Arc<Registry>,
    name: String,
    version: String,
}

impl McpServer {
    pub fn new(registry: Arc<Registry>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            registry,
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handle a single request, producing the response for its id.
    ///
    /// Failures become JSON-RPC error responses; this never returns `Err`.
    pub async fn handle_request(&self, req: JsonRpcRequest, ctx: &TraceContext) -> JsonRpcResponse {
        debug!(method = %req.method, trace = %ctx, "dispatching request");
        let id = req.id.clone();
        let result = self.dispatch(req, ctx).await;
        match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => {
                info!(error = %err, "request failed");
                JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    id,
                    result: None,
                    error: Some(err.to_rpc_error()),
                }
            }
        }
    }

    async fn dispatch(&self, req: JsonRpcRequest, ctx: &TraceContext) -> Result<Value, McpError> {
        match req.method.as_str() {
            "initialize" => Ok(serde_json::to_value(self.initialize_result())?),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(serde_json::to_value(ListToolsResult {
                tools: self.registry.tools(),
            })?),
            "tools/call" => {
                let params: CallToolParams = parse_params(req.params)?;
                let result = self.call_tool(&params.name, params.arguments, ctx).await?;
                Ok(serde_json::to_value(result)?)
            }
            "resources/list" => Ok(serde_json::to_value(ListResourcesResult {
                resources: self.registry.resources(),
            })?),
            "resources/read" => {
                let params: ReadResourceParams = parse_params(req.params)?;
                let result = self.read_resource(&params.uri, ctx).await?;
                Ok(serde_json::to_value(result)?)
            }
            "prompts/list" => Ok(serde_json::to_value(ListPromptsResult {
                prompts: self.registry.prompts(),
            })?),
            "prompts/get" => {
                let params: GetPromptParams = parse_params(req.params)?;
                let result = self.get_prompt(&params.name, &params.arguments)?;
                Ok(serde_json::to_value(result)?)
            }
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    /// The `initialize` response body advertising this server's capabilities.
    pub fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
                resources: Some(ResourcesCapability { subscribe: false }),
                prompts: Some(PromptsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: self.name.clone(),
                version: Some(self.version.clone()),
            },
        }
    }

    /// Invoke a registered tool by name.
    ///
    /// Unknown names error out; an execution failure does not, it comes back
    /// as a [`CallResult`] with `isError` set.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
        ctx: &TraceContext,
    ) -> Result<CallResult, McpError> {
        let handler = self
            .registry
            .tool(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;
        debug!(tool = %name, trace = %ctx, "invoking tool");
        Ok(handler.execute(arguments, ctx).await)
    }

    /// Read a resource by its full URI.
    pub async fn read_resource(
        &self,
        uri: &str,
        ctx: &TraceContext,
    ) -> Result<ReadResult, McpError> {
        let key = resource::view_key(uri)?;
        let handler = self
            .registry
            .resource(&key)
            .ok_or(McpError::Resource(
                todo_gateway_runtime::ResourceError::UnknownResource { key },
            ))?;
        Ok(handler.read(uri, ctx).await)
    }

    /// Render a prompt template with the given arguments.
    pub fn get_prompt(
        &self,
        name: &str,
        arguments: &serde_json::Map<String, Value>,
    ) -> Result<GetPromptResult, McpError> {
        let template = self
            .registry
            .prompt(name)
            .ok_or_else(|| McpError::PromptNotFound(name.to_string()))?;
        Ok(template.render(arguments))
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T, McpError> {
    let value = params.unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| McpError::InvalidParams(e.to_string()))
}
