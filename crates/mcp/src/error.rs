//! Protocol-level error type.
//!
//! Every variant maps onto a JSON-RPC error code, so transports can turn
//! any failure into a well-formed error response without inspecting it.

use thiserror::Error;
use todo_gateway_runtime::ResourceError;

use crate::types::{error_codes, JsonRpcError};

/// Errors surfaced while dispatching protocol messages.
///
/// Tool execution failures never appear here: a tool that fails still
/// produces a [`CallResult`](crate::types::CallResult) with `isError` set,
/// which travels back as a successful JSON-RPC response.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("failed to parse message: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("prompt not found: {0}")]
    PromptNotFound(String),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("server not initialized")]
    NotInitialized,

    #[error("session is closed")]
    SessionClosed,
}

impl McpError {
    /// The JSON-RPC error code for this failure.
    pub fn code(&self) -> i64 {
        match self {
            McpError::JsonParse(_) => error_codes::PARSE_ERROR,
            McpError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            McpError::ToolNotFound(_) | McpError::PromptNotFound(_) => {
                error_codes::INVALID_PARAMS
            }
            McpError::Resource(_) => error_codes::INVALID_PARAMS,
            McpError::NotInitialized => error_codes::SERVER_NOT_INITIALIZED,
            McpError::SessionClosed => error_codes::INVALID_REQUEST,
        }
    }

    /// Render this failure as a JSON-RPC error object.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        JsonRpcError {
            code: self.code(),
            message: self.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            McpError::MethodNotFound("nope".into()).code(),
            error_codes::METHOD_NOT_FOUND
        );
        assert_eq!(McpError::NotInitialized.code(), error_codes::SERVER_NOT_INITIALIZED);
        assert_eq!(
            McpError::InvalidParams("bad".into()).code(),
            error_codes::INVALID_PARAMS
        );
    }

    #[test]
    fn test_to_rpc_error_message() {
        let err = McpError::ToolNotFound("todos-frobnicate".into());
        let rpc = err.to_rpc_error();
        assert_eq!(rpc.code, error_codes::INVALID_PARAMS);
        assert_eq!(rpc.message, "tool not found: todos-frobnicate");
    }
}
