//! Dashboard: Axum web server exposing match records and statistics.
//!
//! Serves a JSON REST API. CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch},
    Router,
};
use std::future::Future;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use routes::{ApiError, AppState, DashboardState};

/// Serve the dashboard until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = bind(port).await?;
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Dashboard server error")
}

async fn bind(port: u16) -> Result<tokio::net::TcpListener> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;
    info!(port, "Dashboard server starting on http://localhost:{port}");
    Ok(listener)
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/leagues", get(routes::get_leagues))
        .route("/api/teams", get(routes::get_teams))
        .route("/api/teams/:id", get(routes::get_team))
        .route("/api/teams/:id/matches", get(routes::get_team_matches))
        .route("/api/matches", get(routes::get_matches))
        .route("/api/matches/:id", get(routes::get_match))
        .route("/api/matches/:id/result", patch(routes::patch_result))
        .route("/api/matches/:id/prediction", patch(routes::patch_prediction))
        .route("/api/matches/:id/status", patch(routes::patch_status))
        .route("/api/my-predictions", get(routes::get_my_predictions))
        .route("/api/stats", get(routes::get_stats))
        .route("/api/stats/advanced", get(routes::get_advanced_stats))
        .route("/api/stats/results", get(routes::get_results))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
