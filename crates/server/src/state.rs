//! Shared application state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use todo_gateway_backend::TodoBackend;
use todo_gateway_mcp::{McpServer, SessionHandle};
use todo_gateway_runtime::registry::RegistryError;
use todo_gateway_runtime::resource::TodosWithDueDate;
use todo_gateway_runtime::{prompt, tools, Registry};
use uuid::Uuid;

/// State shared across all request handlers.
pub struct AppState {
    pub registry: Arc<Registry>,
    pub mcp: Arc<McpServer>,
    /// Live SSE sessions, keyed by session id. Entries are removed when the
    /// event stream drops; a POST against a missing entry is a 404.
    pub sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, mcp: Arc<McpServer>) -> Self {
        Self {
            registry,
            mcp,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

/// Build the full registry: every tool, the due-date resource view, and the
/// prompt templates.
pub fn build_registry(backend: Arc<dyn TodoBackend>) -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    tools::register_all(&mut registry, backend.clone())?;
    registry.register_resource(
        "with-due-date",
        Arc::new(TodosWithDueDate::new(backend)),
    )?;
    registry.register_prompt(Arc::new(prompt::add_todo_prompt()))?;
    registry.register_prompt(Arc::new(prompt::update_todo_prompt()))?;
    Ok(registry)
}
