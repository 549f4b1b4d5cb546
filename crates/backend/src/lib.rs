//! Backend client adapter for the todo-api service.
//!
//! Wraps outbound HTTP calls to the todo CRUD backend and normalizes every
//! response into a [`BackendOutcome`], so executors deal with exactly five
//! cases instead of raw status codes and transport errors.
//!
//! - **types**: wire types shared with the backend (`Todo`, requests)
//! - **outcome**: the normalized `BackendOutcome` union
//! - **client**: `TodoBackend` trait and the reqwest-based `TodoClient`

pub mod client;
pub mod outcome;
pub mod types;

pub use client::{ClientBuildError, TodoBackend, TodoClient};
pub use outcome::BackendOutcome;
pub use types::{CreateTodoRequest, Todo, UpdateTodoRequest};
