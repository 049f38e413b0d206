//! HTTP transport using Axum
//!
//! JSON API over the price feed, the depth analyzer and the prediction book.

pub mod error;
pub mod handler;

use axum::{routing::get, Router};
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::config::HttpConfig;
use handler::{
    handle_depth, handle_health, handle_list_predictions, handle_place_prediction, handle_price,
};
pub use handler::AppState;

/// Builds the router with every endpoint mounted
///
/// # CORS
/// Configured to allow all origins (*) so a browser page on another origin
/// can call the API.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/btc-price", get(handle_price))
        .route("/api/btc-depth", get(handle_depth))
        .route(
            "/api/predictions",
            get(handle_list_predictions).post(handle_place_prediction),
        )
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Serves the API until `shutdown` fires
pub async fn start_http_server(
    config: &HttpConfig,
    state: AppState,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    let addr = listener.local_addr()?;

    tracing::info!("HTTP server listening on {}", addr);
    tracing::info!("  GET  http://{}/api/btc-price", addr);
    tracing::info!("  GET  http://{}/api/btc-depth", addr);
    tracing::info!("  GET  http://{}/api/predictions", addr);
    tracing::info!("  POST http://{}/api/predictions", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.recv().await.ok();
            tracing::info!("Shutting down HTTP server...");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
