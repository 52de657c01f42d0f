//! HTTP server exposing the releases feed

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::release::aggregator::Aggregator;
use crate::release::http_client::HttpUpstreamClient;
use crate::release::types::{RepositoryRef, ResolvedRelease};

/// Shared, read-only state of the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<Aggregator>,
    source_repositories: Arc<Vec<RepositoryRef>>,
    package_repositories: Arc<Vec<RepositoryRef>>,
}

impl AppState {
    pub fn new(
        aggregator: Aggregator,
        source_repositories: Vec<RepositoryRef>,
        package_repositories: Vec<RepositoryRef>,
    ) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            source_repositories: Arc::new(source_repositories),
            package_repositories: Arc::new(package_repositories),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/releases", get(list_releases))
        .route("/healthz", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// `GET /api/releases`: resolves every configured repository on each call
async fn list_releases(State(state): State<AppState>) -> Json<Vec<ResolvedRelease>> {
    let releases = state
        .aggregator
        .aggregate(
            &state.source_repositories,
            &state.package_repositories,
            Utc::now(),
        )
        .await;
    Json(releases)
}

async fn health_check() -> &'static str {
    "ok"
}

/// Binds the configured host and port and serves until Ctrl-C
pub async fn run(config: Config) -> anyhow::Result<()> {
    let client = HttpUpstreamClient::new()?;
    let aggregator = Aggregator::from_config(Arc::new(client), &config);
    let state = AppState::new(
        aggregator,
        config.source_repositories.clone(),
        config.package_repositories.clone(),
    );

    info!(
        "Tracking {} repositories and {} charts",
        config.source_repositories.len(),
        config.package_repositories.len()
    );
    if config.source_repositories.is_empty() && config.package_repositories.is_empty() {
        warn!("No repositories configured; /api/releases will return an empty list");
    }

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
