use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use service::{runtime, ListStore, ShoppingListService};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Resolve the bind address from the normalized server config
fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address: {e}")))
}

/// Build the application router around an already constructed store.
pub fn build_app(store: Arc<dyn ListStore>) -> Router {
    let state = AppState { list_svc: ShoppingListService::new(store) };
    routes::build_router(state, build_cors())
}

/// Public entry: wire storage, build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let store = runtime::build_store(&cfg.storage)
        .await
        .map_err(|e| StartupError::Storage(e.to_string()))?;
    info!(backend = store.backend(), "shopping list store initialized");

    let app = build_app(store);

    // Bind and serve
    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "shopping list server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
