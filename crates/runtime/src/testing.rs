//! Scripted backend for tests.
//!
//! Records every call and replays queued outcomes, so tests can assert both
//! on results and on whether the backend was reached at all. Enabled for
//! downstream crates via the `test-utils` feature.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use todo_gateway_backend::{
    BackendOutcome, CreateTodoRequest, Todo, TodoBackend, UpdateTodoRequest,
};
use todo_gateway_core::TraceContext;

#[derive(Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<&'static str>>,
    create: Mutex<VecDeque<BackendOutcome<Todo>>>,
    list: Mutex<VecDeque<BackendOutcome<Vec<Todo>>>>,
    update: Mutex<VecDeque<BackendOutcome<Todo>>>,
    delete: Mutex<VecDeque<BackendOutcome<()>>>,
    /// Per-call artificial latency, popped in call order across operations.
    delays: Mutex<VecDeque<Duration>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create(&self, outcome: BackendOutcome<Todo>) {
        self.create.lock().unwrap().push_back(outcome);
    }

    pub fn push_list(&self, outcome: BackendOutcome<Vec<Todo>>) {
        self.list.lock().unwrap().push_back(outcome);
    }

    pub fn push_update(&self, outcome: BackendOutcome<Todo>) {
        self.update.lock().unwrap().push_back(outcome);
    }

    pub fn push_delete(&self, outcome: BackendOutcome<()>) {
        self.delete.lock().unwrap().push_back(outcome);
    }

    /// Queue an artificial delay for the next backend call.
    pub fn push_delay(&self, delay: Duration) {
        self.delays.lock().unwrap().push_back(delay);
    }

    /// Operation names in invocation order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, operation: &'static str) {
        self.calls.lock().unwrap().push(operation);
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn unscripted<T>() -> BackendOutcome<T> {
        BackendOutcome::TransportFailure {
            cause: "unscripted call".to_string(),
        }
    }
}

#[async_trait]
impl TodoBackend for ScriptedBackend {
    async fn create_todo(
        &self,
        _req: CreateTodoRequest,
        _ctx: &TraceContext,
    ) -> BackendOutcome<Todo> {
        self.record("create_todo").await;
        self.create
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::unscripted)
    }

    async fn list_todos(&self, _ctx: &TraceContext) -> BackendOutcome<Vec<Todo>> {
        self.record("list_todos").await;
        self.list
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::unscripted)
    }

    async fn update_todo(
        &self,
        _id: u32,
        _req: UpdateTodoRequest,
        _ctx: &TraceContext,
    ) -> BackendOutcome<Todo> {
        self.record("update_todo").await;
        self.update
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::unscripted)
    }

    async fn delete_todo(&self, _id: u32, _ctx: &TraceContext) -> BackendOutcome<()> {
        self.record("delete_todo").await;
        self.delete
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::unscripted)
    }
}
