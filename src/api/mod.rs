//! REST API
//!
//! Read-only JSON endpoints over a loaded corpus: pattern lookup plus the
//! salience, gestalt and emergence queries.

pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, DEFAULT_SALIENCE_LIMIT};

/// Build the router with every endpoint mounted
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/patterns", get(routes::list_patterns))
        .route("/patterns/:id", get(routes::get_pattern))
        .route("/salience", post(routes::compute_salience))
        .route("/gestalt", post(routes::detect_gestalt))
        .route("/emergence", post(routes::track_emergence))
        .route("/categories", get(routes::list_categories))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the process is stopped
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let patterns = state.engine.len();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, patterns, "pattern API listening");
    axum::serve(listener, build_router(state)).await
}
