//! Name → handler registry for tools, resources, and prompts.
//!
//! Built once at startup, then shared behind an `Arc` with no interior
//! mutability, so concurrent reads are safe by construction. List calls
//! return fresh definition snapshots in registration order.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::prompt::{PromptDefinition, PromptTemplate};
use crate::resource::{ResourceDefinition, ResourceHandler};
use crate::tool::{ToolDefinition, ToolHandler};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{kind} with name '{name}' is already registered")]
    DuplicateName { kind: &'static str, name: String },
}

#[derive(Default)]
pub struct Registry {
    tools: IndexMap<String, Arc<dyn ToolHandler>>,
    resources: IndexMap<String, Arc<dyn ResourceHandler>>,
    prompts: IndexMap<String, Arc<PromptTemplate>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register_tool(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), RegistryError> {
        let name = handler.definition().name;
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateName { kind: "tool", name });
        }
        self.tools.insert(name, handler);
        Ok(())
    }

    /// Register a resource view, keyed by the locator's host+path.
    pub fn register_resource(
        &mut self,
        key: impl Into<String>,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), RegistryError> {
        let key = key.into();
        if self.resources.contains_key(&key) {
            return Err(RegistryError::DuplicateName {
                kind: "resource",
                name: key,
            });
        }
        self.resources.insert(key, handler);
        Ok(())
    }

    /// Register a prompt template.
    pub fn register_prompt(&mut self, prompt: Arc<PromptTemplate>) -> Result<(), RegistryError> {
        let name = prompt.name().to_string();
        if self.prompts.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                kind: "prompt",
                name,
            });
        }
        self.prompts.insert(name, prompt);
        Ok(())
    }

    pub fn tool(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).cloned()
    }

    pub fn resource(&self, key: &str) -> Option<Arc<dyn ResourceHandler>> {
        self.resources.get(key).cloned()
    }

    pub fn prompt(&self, name: &str) -> Option<Arc<PromptTemplate>> {
        self.prompts.get(name).cloned()
    }

    /// Snapshot of every tool definition, in registration order.
    pub fn tools(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    pub fn resources(&self) -> Vec<ResourceDefinition> {
        self.resources.values().map(|r| r.definition()).collect()
    }

    pub fn prompts(&self) -> Vec<PromptDefinition> {
        self.prompts.values().map(|p| p.definition()).collect()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::add_todo_prompt;
    use crate::resource::TodosWithDueDate;
    use crate::testing::ScriptedBackend;
    use crate::tools::HelloTool;

    #[test]
    fn test_register_and_lookup_tool() {
        let mut registry = Registry::new();
        registry.register_tool(Arc::new(HelloTool)).unwrap();

        assert_eq!(registry.tool_count(), 1);
        assert!(registry.tool("hello").is_some());
        assert!(registry.tool("nonexistent").is_none());
    }

    #[test]
    fn test_lookup_returns_equal_definition() {
        let mut registry = Registry::new();
        registry.register_tool(Arc::new(HelloTool)).unwrap();

        let registered = HelloTool.definition();
        let looked_up = registry.tool("hello").unwrap().definition();
        assert_eq!(looked_up, registered);
    }

    #[test]
    fn test_duplicate_tool_name_rejected() {
        let mut registry = Registry::new();
        registry.register_tool(Arc::new(HelloTool)).unwrap();
        let err = registry.register_tool(Arc::new(HelloTool)).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateName { kind: "tool", .. }
        ));
    }

    #[test]
    fn test_same_name_across_kinds_is_allowed() {
        let mut registry = Registry::new();
        registry.register_prompt(Arc::new(add_todo_prompt())).unwrap();
        // A tool may share the prompt's name; kinds are separate namespaces.
        let backend = Arc::new(ScriptedBackend::new());
        registry
            .register_tool(Arc::new(crate::tools::AddTodoTool::new(backend)))
            .unwrap();
    }

    #[test]
    fn test_duplicate_resource_key_rejected() {
        let mut registry = Registry::new();
        let backend = Arc::new(ScriptedBackend::new());
        registry
            .register_resource("with-due-date", Arc::new(TodosWithDueDate::new(backend.clone())))
            .unwrap();
        assert!(registry
            .register_resource("with-due-date", Arc::new(TodosWithDueDate::new(backend)))
            .is_err());
    }

    #[test]
    fn test_list_is_fresh_snapshot_in_registration_order() {
        let mut registry = Registry::new();
        let backend = Arc::new(ScriptedBackend::new());
        crate::tools::register_all(&mut registry, backend).unwrap();

        let first = registry.tools();
        let second = registry.tools();
        assert_eq!(first, second);
        let names: Vec<_> = first.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["hello", "todos-add", "todos-list", "todos-update", "todos-delete"]
        );
    }
}
