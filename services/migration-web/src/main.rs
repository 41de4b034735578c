//! Drive Migration Web
//!
//! Single-binary Rust service that:
//! 1. Walks a user through the Google OAuth authorization-code flow
//! 2. Verifies the returned ID token against Google's JWKS (best effort)
//! 3. Copies one configured Drive file into a configured destination folder
//!    with the credentials that came out of the flow

mod config;
mod error;
mod flow;
mod metrics;
mod pages;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use google_auth::{CredentialStore, IdentityVerifier, StateRegistry, TokenExchangeClient};
use google_drive::DriveClient;

use crate::config::Config;
use crate::flow::FlowState;
use crate::metrics::ServiceMetrics;
use crate::routes::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting drive-migration-web");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        client_id = %config.oauth.client_id,
        redirect_uri = %config.oauth.redirect_uri,
        access_type = config.oauth.access_type.as_str(),
        source_file_id = %config.copy.source_file_id,
        destination_folder_id = %config.copy.destination_folder_id,
        "configuration loaded"
    );

    let client_secret = config
        .oauth
        .client_secret
        .context("client secret missing after config load")?;

    let http = reqwest::Client::new();
    let timeout = Duration::from_secs(config.http.timeout_secs);

    let flow = FlowState {
        states: Arc::new(StateRegistry::new(Duration::from_secs(
            config.flow.state_ttl_secs,
        ))),
        credentials: Arc::new(CredentialStore::new(Duration::from_secs(
            config.flow.credential_ttl_secs,
        ))),
        exchange: Arc::new(TokenExchangeClient::new(
            http.clone(),
            config.oauth.client_id.clone(),
            client_secret,
            config.oauth.redirect_uri.clone(),
            timeout,
        )),
        verifier: Arc::new(IdentityVerifier::new(
            http.clone(),
            config.oauth.client_id.clone(),
            timeout,
        )),
        drive: Arc::new(DriveClient::new(http, timeout)),
        client_id: config.oauth.client_id,
        redirect_uri: config.oauth.redirect_uri,
        access_type: config.oauth.access_type,
        source_file_id: config.copy.source_file_id,
        destination_folder_id: config.copy.destination_folder_id,
        metrics: ServiceMetrics::new(),
    };

    let app_state = AppState {
        flow,
        prometheus: prometheus_handle,
    };

    let app = build_router(app_state, config.server.max_connections);

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.server.listen_addr))?;

    info!(addr = %config.server.listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
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
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
