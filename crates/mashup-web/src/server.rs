//! HTTP server setup and routing

use crate::handlers;
use crate::jobs::JobStore;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub store: JobStore,
}

/// Run the HTTP server until it is shut down
pub async fn run(bind_addr: &str, store: JobStore) -> anyhow::Result<()> {
    let ctx = AppContext { store };

    let app = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/mashups", post(handlers::create_mashup))
        .route("/mashups/:id", get(handlers::mashup_status))
        .route("/mashups/:id", delete(handlers::cancel_mashup))
        .route("/mashups/:id/download", get(handlers::download_mashup))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("mashup-web listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
