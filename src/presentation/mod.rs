// Presentation layer - HTTP routes over the dashboard state
pub mod app_state;
pub mod error;
pub mod handlers;

use crate::infrastructure::config::ServerSettings;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    all_data, change_range, dashboard, health_check, last_data, predict, status,
};
use anyhow::Context;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>, server: &ServerSettings) -> anyhow::Result<Router> {
    let mut router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/data/all", get(all_data))
        .route("/api/data/last", get(last_data))
        .route("/api/status", get(status))
        .route("/api/predict", post(predict))
        .route("/api/dashboard", get(dashboard))
        .route("/api/dashboard/charts/:id/range", post(change_range));

    if let Some(dir) = &server.static_dir {
        if Path::new(dir).is_dir() {
            tracing::info!("Serving frontend from {}", dir);
            router = router.fallback_service(ServeDir::new(dir));
        } else {
            tracing::warn!("Static directory {} does not exist, frontend is not served", dir);
        }
    }

    Ok(router
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&server.cors_origins)?)
        .with_state(state))
}

/// Any origin when none are configured, otherwise only the listed ones
fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
