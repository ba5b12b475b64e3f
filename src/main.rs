// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::poller::Poller;
use crate::application::sensor_repository::SensorRepository;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::firebase_repository::FirebaseRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_app_config()?;

    // Initialize tracing, RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Create repository (infrastructure layer)
    let repository: Arc<dyn SensorRepository> =
        Arc::new(FirebaseRepository::new(&config.source));
    if !repository.is_configured() {
        tracing::warn!(
            "DASHBOARD__SOURCE__DATABASE_URL or DASHBOARD__SOURCE__AUTH_TOKEN is not set, the sensor source will not be polled successfully"
        );
    }

    // Create services (application layer)
    let dashboard_service = DashboardService::new(&config.dashboard)?;
    let poller = Poller::new(
        repository.clone(),
        dashboard_service.clone(),
        Duration::from_millis(config.dashboard.poll_interval_ms),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_handle = tokio::spawn(poller.run(shutdown_rx));

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        repository,
    });

    // Build router (presentation layer)
    let router = build_router(state, &config.server)?;

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;
    tracing::info!("Starting climate-dashboard service on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    poller_handle.await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
