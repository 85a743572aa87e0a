//! HTTP server setup and routing

use crate::engine::LiveEngine;
use crate::error::{Error, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
///
/// **Note:** AppContext implements Clone, which gives us `FromRef<AppContext>`
/// for free via Axum's blanket implementation.
#[derive(Clone)]
pub struct AppContext {
    pub engine: Arc<LiveEngine>,
}

/// Build the full route table
pub fn create_router(engine: Arc<LiveEngine>) -> Router {
    let ctx = AppContext { engine };

    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Public viewer endpoints
        .route("/live/queue", get(super::handlers::get_queue))
        .route("/live/playlist", get(super::handlers::get_active_playlist))
        .route("/jukebox/request", post(super::handlers::jukebox_request))
        .route("/events", get(super::sse::viewer_events))
        // DJ console
        .route("/dj/priority", post(super::handlers::dj_priority))
        .route("/dj/commercial", post(super::handlers::dj_commercial))
        .route("/dj/ban", post(super::handlers::dj_ban))
        .route("/dj/playlist/:playlist_id/activate", post(super::handlers::dj_activate_playlist))
        .route("/dj/play", post(super::handlers::dj_play))
        .route("/dj/pause", post(super::handlers::dj_pause))
        .route("/dj/skip", post(super::handlers::dj_skip))
        .route("/dj/queue/reorder", post(super::handlers::dj_reorder_queue))
        .route("/dj/queue/promote", post(super::handlers::dj_promote_entry))
        .route("/dj/volume", post(super::handlers::dj_volume))
        // Player agent (shared-secret gated)
        .route("/agent/events", get(super::sse::agent_events))
        .route("/agent/song-ended", post(super::handlers::agent_song_ended))
        // Attach application context
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for the club-floor displays and DJ console
        .layer(CorsLayer::permissive())
}

/// Run the HTTP API server until shutdown is signalled
pub async fn run(engine: Arc<LiveEngine>) -> Result<()> {
    let port = engine.config().port;
    let app = create_router(engine);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
