//! Todo CRUD tools backed by the todo-api service.
//!
//! Every handler follows the same pipeline: validate arguments, translate to
//! the adapter's payload shape, invoke the backend with the call's trace
//! context, and map the outcome into a `CallResult`. All five outcome
//! variants are matched in every handler; nothing here returns early with a
//! transport-level error.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use todo_gateway_backend::{BackendOutcome, CreateTodoRequest, TodoBackend, UpdateTodoRequest};
use todo_gateway_core::TraceContext;

use crate::result::CallResult;
use crate::tool::{parse_arguments, text_output_schema, ToolDefinition, ToolHandler};

const ID_REQUIRED: &str = "Error: id parameter is required and must be greater than 0";

/// Error result for a status code the backend didn't explain as a client
/// problem.
fn upstream_error(status: u16, detail: &str) -> CallResult {
    if detail.is_empty() {
        CallResult::error(format!("Error: received status code {status}"))
    } else {
        CallResult::error(format!("Error: received status code {status}: {detail}"))
    }
}

fn not_found(id: u32) -> CallResult {
    CallResult::error(format!("Todo with id {id} not found"))
}

/// Validate an identifier argument: present, positive, and within range.
fn require_id(id: Option<i64>) -> Result<u32, CallResult> {
    match id {
        Some(id) if id > 0 => {
            u32::try_from(id).map_err(|_| CallResult::error("Error: id parameter is out of range"))
        }
        _ => Err(CallResult::error(ID_REQUIRED)),
    }
}

// ── todos-add ───────────────────────────────────────────────────────

pub struct AddTodoTool {
    backend: Arc<dyn TodoBackend>,
}

impl AddTodoTool {
    pub fn new(backend: Arc<dyn TodoBackend>) -> Self {
        Self { backend }
    }
}

#[derive(Debug, Deserialize)]
struct AddTodoInput {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
}

#[async_trait]
impl ToolHandler for AddTodoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "todos-add".to_string(),
            description: "Create a new todo item with a title and an optional due date"
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Title of the todo item"
                    },
                    "due_date": {
                        "type": "string",
                        "format": "date-time",
                        "description": "Optional due date (RFC 3339)"
                    }
                },
                "required": ["title"]
            }),
            output_schema: text_output_schema(),
        }
    }

    async fn execute(&self, arguments: Value, ctx: &TraceContext) -> CallResult {
        let input: AddTodoInput = match parse_arguments(arguments) {
            Ok(input) => input,
            Err(result) => return result,
        };

        let title = match input.title {
            Some(title) if !title.is_empty() => title,
            _ => {
                return CallResult::error(
                    "Error: title parameter is required and must be a non-empty string",
                )
            }
        };

        let req = CreateTodoRequest {
            title: title.clone(),
            due_date: input.due_date,
        };

        match self.backend.create_todo(req, ctx).await {
            BackendOutcome::Success(_) => CallResult::text(format!("Added todo: {title}")),
            BackendOutcome::ValidationRejected { detail } => CallResult::error(detail),
            BackendOutcome::NotFound { id } => not_found(id),
            BackendOutcome::UpstreamError { status, detail } => upstream_error(status, &detail),
            BackendOutcome::TransportFailure { cause } => {
                CallResult::error(format!("Error creating todo: {cause}"))
            }
        }
    }
}

// ── todos-list ──────────────────────────────────────────────────────

pub struct ListTodosTool {
    backend: Arc<dyn TodoBackend>,
}

impl ListTodosTool {
    pub fn new(backend: Arc<dyn TodoBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for ListTodosTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "todos-list".to_string(),
            description: "List all todo items".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
            output_schema: text_output_schema(),
        }
    }

    async fn execute(&self, _arguments: Value, ctx: &TraceContext) -> CallResult {
        match self.backend.list_todos(ctx).await {
            BackendOutcome::Success(todos) => {
                if todos.is_empty() {
                    // Agent-visible contract from the original service: an
                    // empty list is reported as an error result.
                    return CallResult::error("No todos found");
                }
                match serde_json::to_string_pretty(&todos) {
                    Ok(json) => CallResult::text(json),
                    Err(e) => CallResult::error(format!("Error formatting todos: {e}")),
                }
            }
            BackendOutcome::ValidationRejected { detail } => CallResult::error(detail),
            BackendOutcome::NotFound { id } => not_found(id),
            BackendOutcome::UpstreamError { status, detail } => upstream_error(status, &detail),
            BackendOutcome::TransportFailure { cause } => {
                CallResult::error(format!("Error fetching todos: {cause}"))
            }
        }
    }
}

// ── todos-update ────────────────────────────────────────────────────

pub struct UpdateTodoTool {
    backend: Arc<dyn TodoBackend>,
}

impl UpdateTodoTool {
    pub fn new(backend: Arc<dyn TodoBackend>) -> Self {
        Self { backend }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateTodoInput {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
}

#[async_trait]
impl ToolHandler for UpdateTodoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "todos-update".to_string(),
            description: "Update an existing todo item's title or due date".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "integer",
                        "description": "ID of the todo item to update"
                    },
                    "title": {
                        "type": "string",
                        "description": "New title"
                    },
                    "due_date": {
                        "type": "string",
                        "format": "date-time",
                        "description": "New due date (RFC 3339)"
                    }
                },
                "required": ["id"]
            }),
            output_schema: text_output_schema(),
        }
    }

    async fn execute(&self, arguments: Value, ctx: &TraceContext) -> CallResult {
        let input: UpdateTodoInput = match parse_arguments(arguments) {
            Ok(input) => input,
            Err(result) => return result,
        };

        let id = match require_id(input.id) {
            Ok(id) => id,
            Err(result) => return result,
        };

        let title = input.title.filter(|t| !t.is_empty());
        let req = UpdateTodoRequest {
            title: title.clone(),
            due_date: input.due_date,
        };

        match self.backend.update_todo(id, req, ctx).await {
            BackendOutcome::Success(_) => {
                let mut text = format!("Updated todo #{id}");
                if let Some(title) = title {
                    text.push_str(&format!(" with title: {title}"));
                }
                CallResult::text(text)
            }
            BackendOutcome::ValidationRejected { detail } => CallResult::error(detail),
            BackendOutcome::NotFound { id } => not_found(id),
            BackendOutcome::UpstreamError { status, detail } => upstream_error(status, &detail),
            BackendOutcome::TransportFailure { cause } => {
                CallResult::error(format!("Error updating todo: {cause}"))
            }
        }
    }
}

// ── todos-delete ────────────────────────────────────────────────────

pub struct DeleteTodoTool {
    backend: Arc<dyn TodoBackend>,
}

impl DeleteTodoTool {
    pub fn new(backend: Arc<dyn TodoBackend>) -> Self {
        Self { backend }
    }
}

#[derive(Debug, Deserialize)]
struct DeleteTodoInput {
    #[serde(default)]
    id: Option<i64>,
}

#[async_trait]
impl ToolHandler for DeleteTodoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "todos-delete".to_string(),
            description: "Delete a todo item by ID".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "integer",
                        "description": "ID of the todo item to delete"
                    }
                },
                "required": ["id"]
            }),
            output_schema: text_output_schema(),
        }
    }

    async fn execute(&self, arguments: Value, ctx: &TraceContext) -> CallResult {
        let input: DeleteTodoInput = match parse_arguments(arguments) {
            Ok(input) => input,
            Err(result) => return result,
        };

        let id = match require_id(input.id) {
            Ok(id) => id,
            Err(result) => return result,
        };

        match self.backend.delete_todo(id, ctx).await {
            BackendOutcome::Success(()) => {
                CallResult::text(format!("Successfully deleted todo #{id}"))
            }
            BackendOutcome::ValidationRejected { detail } => CallResult::error(detail),
            BackendOutcome::NotFound { id } => not_found(id),
            BackendOutcome::UpstreamError { status, detail } => upstream_error(status, &detail),
            BackendOutcome::TransportFailure { cause } => {
                CallResult::error(format!("Error deleting todo: {cause}"))
            }
        }
    }
}
