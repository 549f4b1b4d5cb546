//! Readable data views addressed by `todos://` locators.
//!
//! A locator's scheme is validated before use; its host+path component keys
//! into the registry's named view map. Views are read-only: they call the
//! backend, filter, and render JSON. Business-level failures render as an
//! error JSON body inside a normal `ReadResult` so the agent always gets
//! parseable contents.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use todo_gateway_backend::{BackendOutcome, TodoBackend};
use todo_gateway_core::TraceContext;

/// URI scheme every resource locator must carry.
pub const URI_SCHEME: &str = "todos";

/// Describes a resource in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// Result of reading a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResult {
    pub contents: Vec<ResourceContents>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

/// Locator-level failures, surfaced as protocol errors rather than result
/// envelopes.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("invalid resource URI '{uri}'")]
    InvalidUri { uri: String },

    #[error("unsupported scheme '{scheme}', expected '{expected}'")]
    UnsupportedScheme {
        scheme: String,
        expected: &'static str,
    },

    #[error("unknown resource '{key}'")]
    UnknownResource { key: String },
}

/// Parse and validate a locator, returning the view key (host + path).
pub fn view_key(uri: &str) -> Result<String, ResourceError> {
    let parsed = Url::parse(uri).map_err(|_| ResourceError::InvalidUri {
        uri: uri.to_string(),
    })?;
    if parsed.scheme() != URI_SCHEME {
        return Err(ResourceError::UnsupportedScheme {
            scheme: parsed.scheme().to_string(),
            expected: URI_SCHEME,
        });
    }
    let host = parsed.host_str().unwrap_or_default();
    let path = parsed.path().trim_end_matches('/');
    Ok(format!("{host}{path}"))
}

/// One handler per readable view.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    fn definition(&self) -> ResourceDefinition;

    /// Read the view. Backend failures render as error JSON contents; this
    /// only sees locators that already passed scheme/key validation.
    async fn read(&self, uri: &str, ctx: &TraceContext) -> ReadResult;
}

fn error_contents(uri: &str, message: &str) -> ReadResult {
    ReadResult {
        contents: vec![ResourceContents {
            uri: uri.to_string(),
            mime_type: "application/json".to_string(),
            text: serde_json::json!({ "error": message }).to_string(),
        }],
    }
}

// ── todos://with-due-date ───────────────────────────────────────────

/// Todos that carry a due date.
pub struct TodosWithDueDate {
    backend: Arc<dyn TodoBackend>,
}

impl TodosWithDueDate {
    pub const URI: &'static str = "todos://with-due-date";

    pub fn new(backend: Arc<dyn TodoBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ResourceHandler for TodosWithDueDate {
    fn definition(&self) -> ResourceDefinition {
        ResourceDefinition {
            uri: Self::URI.to_string(),
            name: "Todos with due date".to_string(),
            description: "All todo items that have a due date set".to_string(),
            mime_type: "application/json".to_string(),
        }
    }

    async fn read(&self, uri: &str, ctx: &TraceContext) -> ReadResult {
        let todos = match self.backend.list_todos(ctx).await {
            BackendOutcome::Success(todos) => todos,
            BackendOutcome::ValidationRejected { detail } => {
                return error_contents(uri, &detail);
            }
            BackendOutcome::NotFound { id } => {
                return error_contents(uri, &format!("Todo with id {id} not found"));
            }
            BackendOutcome::UpstreamError { status, .. } => {
                return error_contents(uri, &format!("received status code {status}"));
            }
            BackendOutcome::TransportFailure { cause } => {
                return error_contents(uri, &format!("error fetching todos: {cause}"));
            }
        };

        let with_due_date: Vec<_> = todos.into_iter().filter(|t| t.due_date.is_some()).collect();
        if with_due_date.is_empty() {
            return error_contents(uri, "No todos found");
        }

        match serde_json::to_string_pretty(&with_due_date) {
            Ok(json) => ReadResult {
                contents: vec![ResourceContents {
                    uri: uri.to_string(),
                    mime_type: "application/json".to_string(),
                    text: json,
                }],
            },
            Err(e) => error_contents(uri, &format!("error formatting todos: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use chrono::Utc;
    use todo_gateway_backend::Todo;

    #[test]
    fn test_view_key_strips_scheme() {
        assert_eq!(view_key("todos://with-due-date").unwrap(), "with-due-date");
    }

    #[test]
    fn test_view_key_rejects_wrong_scheme() {
        let err = view_key("file://with-due-date").unwrap_err();
        assert!(matches!(err, ResourceError::UnsupportedScheme { .. }));
    }

    #[test]
    fn test_view_key_rejects_garbage() {
        assert!(matches!(
            view_key("not a uri"),
            Err(ResourceError::InvalidUri { .. })
        ));
    }

    fn todo(id: u32, title: &str, due: bool) -> Todo {
        let now = Utc::now();
        Todo {
            id,
            title: title.to_string(),
            due_date: due.then_some(now),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    #[tokio::test]
    async fn test_read_filters_todos_without_due_date() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_list(BackendOutcome::Success(vec![
            todo(1, "with date", true),
            todo(2, "no date", false),
        ]));
        let view = TodosWithDueDate::new(backend);

        let result = view.read(TodosWithDueDate::URI, &TraceContext::new()).await;
        assert_eq!(result.contents.len(), 1);
        let text = &result.contents[0].text;
        assert!(text.contains("with date"));
        assert!(!text.contains("no date"));
    }

    #[tokio::test]
    async fn test_read_empty_renders_error_body() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_list(BackendOutcome::Success(vec![todo(2, "no date", false)]));
        let view = TodosWithDueDate::new(backend);

        let result = view.read(TodosWithDueDate::URI, &TraceContext::new()).await;
        assert!(result.contents[0].text.contains("No todos found"));
    }

    #[tokio::test]
    async fn test_read_transport_failure_renders_error_body() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_list(BackendOutcome::TransportFailure {
            cause: "timeout".to_string(),
        });
        let view = TodosWithDueDate::new(backend);

        let result = view.read(TodosWithDueDate::URI, &TraceContext::new()).await;
        assert!(result.contents[0].text.contains("timeout"));
    }
}
