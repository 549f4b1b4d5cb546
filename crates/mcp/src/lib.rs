//! MCP (Model Context Protocol) layer for the todo gateway.
//!
//! Implements the protocol over JSON-RPC 2.0 and routes every call, whatever
//! transport delivered it, through one dispatch path into the runtime
//! registry.
//!
//! # Architecture
//!
//! - **types**: JSON-RPC 2.0 and MCP-specific protocol types
//! - **server**: dispatch router over the `Registry` (tools, resources, prompts)
//! - **session**: per-connection state machine for the streaming transport
//! - **error**: unified error types with JSON-RPC code mapping

pub mod error;
pub mod server;
pub mod session;
pub mod types;

pub use error::McpError;
pub use server::McpServer;
pub use session::{spawn_session, Session, SessionHandle, SessionState};
pub use types::*;
