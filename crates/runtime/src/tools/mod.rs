//! Tool handler implementations.

pub mod hello;
pub mod todos;

use std::sync::Arc;

use todo_gateway_backend::TodoBackend;

use crate::registry::{Registry, RegistryError};

pub use hello::HelloTool;
pub use todos::{AddTodoTool, DeleteTodoTool, ListTodosTool, UpdateTodoTool};

/// Register every tool the gateway exposes.
pub fn register_all(
    registry: &mut Registry,
    backend: Arc<dyn TodoBackend>,
) -> Result<(), RegistryError> {
    registry.register_tool(Arc::new(HelloTool))?;
    registry.register_tool(Arc::new(AddTodoTool::new(backend.clone())))?;
    registry.register_tool(Arc::new(ListTodosTool::new(backend.clone())))?;
    registry.register_tool(Arc::new(UpdateTodoTool::new(backend.clone())))?;
    registry.register_tool(Arc::new(DeleteTodoTool::new(backend)))?;
    Ok(())
}
