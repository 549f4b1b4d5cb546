//! `TodoBackend` trait and the reqwest-based `TodoClient`.
//!
//! The adapter performs transport-level translation only: payload validation
//! is the caller's job, and no retry policy lives here.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::Instrument;
use url::Url;

use todo_gateway_core::config::BackendConfig;
use todo_gateway_core::TraceContext;

use crate::outcome::BackendOutcome;
use crate::types::{CreateTodoRequest, Todo, UpdateTodoRequest};

/// Outbound interface to the todo-api service.
///
/// Executors depend on this trait, never on `TodoClient` directly, so tests
/// can substitute a scripted or recording backend.
#[async_trait]
pub trait TodoBackend: Send + Sync {
    async fn create_todo(
        &self,
        req: CreateTodoRequest,
        ctx: &TraceContext,
    ) -> BackendOutcome<Todo>;

    async fn list_todos(&self, ctx: &TraceContext) -> BackendOutcome<Vec<Todo>>;

    async fn update_todo(
        &self,
        id: u32,
        req: UpdateTodoRequest,
        ctx: &TraceContext,
    ) -> BackendOutcome<Todo>;

    async fn delete_todo(&self, id: u32, ctx: &TraceContext) -> BackendOutcome<()>;
}

/// Errors constructing the client. The only fatal startup path in the
/// gateway: a process that can't reach its backend configuration exits.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("invalid backend URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP client for the todo-api, with a pooled connection set and a bounded
/// per-request timeout.
pub struct TodoClient {
    client: reqwest::Client,
    base_url: Url,
}

impl TodoClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ClientBuildError> {
        let base_url = Url::parse(&config.base_url).map_err(|source| {
            ClientBuildError::InvalidUrl {
                url: config.base_url.clone(),
                source,
            }
        })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn todos_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{}/todos", base)
    }

    fn todo_url(&self, id: u32) -> String {
        format!("{}/{}", self.todos_url(), id)
    }

    /// Attach trace propagation headers and send.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        ctx: &TraceContext,
        id: Option<u32>,
    ) -> BackendOutcome<T> {
        let response = match request
            .header("traceparent", ctx.traceparent())
            .header("x-request-id", ctx.trace_id())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                return BackendOutcome::TransportFailure {
                    cause: e.to_string(),
                }
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<T>().await {
                Ok(payload) => BackendOutcome::Success(payload),
                Err(e) => BackendOutcome::TransportFailure {
                    cause: format!("failed to decode response body: {e}"),
                },
            };
        }

        let body = response.text().await.unwrap_or_default();
        classify_failure(status.as_u16(), &body, id)
    }
}

/// Map a non-2xx response to its outcome variant.
///
/// 404 becomes `NotFound` when the call carried an identifier; other 4xx
/// become `ValidationRejected` only when the backend's error body names a
/// client-side problem.
fn classify_failure<T>(status: u16, body: &str, id: Option<u32>) -> BackendOutcome<T> {
    if status == 404 {
        if let Some(id) = id {
            return BackendOutcome::NotFound { id };
        }
    }

    if (400..500).contains(&status) && status != 404 {
        if let Some(detail) = error_body_detail(body) {
            return BackendOutcome::ValidationRejected { detail };
        }
    }

    let detail = error_body_detail(body).unwrap_or_else(|| body.to_string());
    BackendOutcome::UpstreamError { status, detail }
}

/// Extract the `error` field from a backend error body, if present.
fn error_body_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.as_str())
        .map(|s| s.to_string())
}

#[async_trait]
impl TodoBackend for TodoClient {
    async fn create_todo(
        &self,
        req: CreateTodoRequest,
        ctx: &TraceContext,
    ) -> BackendOutcome<Todo> {
        let span = tracing::info_span!("backend.create_todo", trace_id = %ctx.trace_id());
        async {
            let outcome: BackendOutcome<Todo> = self
                .send(self.client.post(self.todos_url()).json(&req), ctx, None)
                .await;
            tracing::debug!(outcome = outcome.classification(), "backend call complete");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn list_todos(&self, ctx: &TraceContext) -> BackendOutcome<Vec<Todo>> {
        let span = tracing::info_span!("backend.list_todos", trace_id = %ctx.trace_id());
        async {
            let outcome: BackendOutcome<Vec<Todo>> =
                self.send(self.client.get(self.todos_url()), ctx, None).await;
            tracing::debug!(outcome = outcome.classification(), "backend call complete");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn update_todo(
        &self,
        id: u32,
        req: UpdateTodoRequest,
        ctx: &TraceContext,
    ) -> BackendOutcome<Todo> {
        let span = tracing::info_span!("backend.update_todo", todo_id = id, trace_id = %ctx.trace_id());
        async {
            let outcome: BackendOutcome<Todo> = self
                .send(self.client.put(self.todo_url(id)).json(&req), ctx, Some(id))
                .await;
            tracing::debug!(outcome = outcome.classification(), "backend call complete");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn delete_todo(&self, id: u32, ctx: &TraceContext) -> BackendOutcome<()> {
        let span = tracing::info_span!("backend.delete_todo", todo_id = id, trace_id = %ctx.trace_id());
        async {
            // The backend answers DELETE with a JSON message body; decode it
            // as a throwaway value and keep the unit payload.
            let outcome: BackendOutcome<serde_json::Value> = self
                .send(self.client.delete(self.todo_url(id)), ctx, Some(id))
                .await;
            let outcome = match outcome {
                BackendOutcome::Success(_) => BackendOutcome::Success(()),
                BackendOutcome::ValidationRejected { detail } => {
                    BackendOutcome::ValidationRejected { detail }
                }
                BackendOutcome::NotFound { id } => BackendOutcome::NotFound { id },
                BackendOutcome::UpstreamError { status, detail } => {
                    BackendOutcome::UpstreamError { status, detail }
                }
                BackendOutcome::TransportFailure { cause } => {
                    BackendOutcome::TransportFailure { cause }
                }
            };
            tracing::debug!(outcome = outcome.classification(), "backend call complete");
            outcome
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_404_with_id() {
        let outcome: BackendOutcome<Todo> = classify_failure(404, r#"{"error":"Todo not found"}"#, Some(7));
        assert_eq!(outcome, BackendOutcome::NotFound { id: 7 });
    }

    #[test]
    fn test_classify_404_without_id_is_upstream() {
        let outcome: BackendOutcome<Todo> = classify_failure(404, "", None);
        assert!(matches!(
            outcome,
            BackendOutcome::UpstreamError { status: 404, .. }
        ));
    }

    #[test]
    fn test_classify_400_with_error_body() {
        let outcome: BackendOutcome<Todo> =
            classify_failure(400, r#"{"error":"Title is required"}"#, None);
        assert_eq!(
            outcome,
            BackendOutcome::ValidationRejected {
                detail: "Title is required".to_string()
            }
        );
    }

    #[test]
    fn test_classify_400_without_error_body_is_upstream() {
        let outcome: BackendOutcome<Todo> = classify_failure(400, "<html>bad</html>", None);
        assert!(matches!(
            outcome,
            BackendOutcome::UpstreamError { status: 400, .. }
        ));
    }

    #[test]
    fn test_classify_500() {
        let outcome: BackendOutcome<Todo> =
            classify_failure(500, r#"{"error":"Failed to create todo"}"#, None);
        match outcome {
            BackendOutcome::UpstreamError { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "Failed to create todo");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_base_url_fails_construction() {
        let config = BackendConfig {
            base_url: "not a url".to_string(),
            timeout_secs: 10,
        };
        assert!(matches!(
            TodoClient::new(&config),
            Err(ClientBuildError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_url_joining() {
        let config = BackendConfig {
            base_url: "http://localhost:8080/".to_string(),
            timeout_secs: 10,
        };
        let client = TodoClient::new(&config).unwrap();
        assert_eq!(client.todos_url(), "http://localhost:8080/todos");
        assert_eq!(client.todo_url(42), "http://localhost:8080/todos/42");
    }
}
