//! HTTP router construction.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;
use crate::{api, logging, sse};

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/tools", get(api::list_tools))
        .route("/tools/{name}/invoke", post(api::invoke_tool))
        .route("/capabilities", get(api::capabilities))
        .route("/schema", get(api::schema))
        .route("/sse", get(sse::connect).post(sse::post_message))
        .layer(middleware::from_fn(logging::log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
