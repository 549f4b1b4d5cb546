mod api;
mod logging;
mod router;
mod sse;
mod state;

use std::sync::Arc;

use todo_gateway_backend::{TodoBackend, TodoClient};
use todo_gateway_core::Config;
use todo_gateway_mcp::McpServer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    todo_gateway_core::config::load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let client = TodoClient::new(&config.backend)?;
    let backend: Arc<dyn TodoBackend> = Arc::new(client);

    let registry = Arc::new(state::build_registry(backend)?);
    info!("registry ready: {} tools", registry.tool_count());

    let mcp = Arc::new(McpServer::new(
        registry.clone(),
        "todo-gateway",
        env!("CARGO_PKG_VERSION"),
    ));
    let app_state = Arc::new(state::AppState::new(registry, mcp));
    let app = router::build_router(app_state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
