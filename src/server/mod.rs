//! HTTP server module
//!
//! Provides the Axum-based HTTP server for serving collected statistics.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::cluster::StaticCluster;
use crate::collector::{CollectConfig, InfoClient};
use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Cluster info client
    pub client: Arc<InfoClient>,
}

/// Build the router for the configured paths
pub fn router(state: AppState) -> Router {
    let info_path = state.config.server.info_path.clone();
    let namespaces_path = state.config.server.namespaces_path.clone();

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(&info_path, get(handlers::cluster_info))
        .route(&namespaces_path, get(handlers::namespace_info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Connect to the configured seed hosts
///
/// # Errors
/// Returns an error if none of the hosts can be reached
pub async fn connect(config: &Config) -> AppResult<InfoClient> {
    let collect_config = CollectConfig::from(&config.cluster);
    let cluster = StaticCluster::connect(&config.cluster.hosts, collect_config.timeout()).await?;
    Ok(InfoClient::new(Arc::new(cluster), collect_config))
}

/// Run the HTTP server
///
/// # Arguments
/// * `config` - Validated application configuration
///
/// # Errors
/// Returns an error if the cluster is unreachable or the server fails to start
pub async fn run(config: Config) -> AppResult<()> {
    let bind_address = config.server.bind_address.clone();
    let port = config.server.port;

    let client = Arc::new(connect(&config).await?);

    let state = AppState {
        config: Arc::new(config),
        client: Arc::clone(&client),
    };
    let app = router(state);

    // Handle "localhost" specially, otherwise parse as IP address
    let bind_addr: std::net::IpAddr = if bind_address == "localhost" {
        std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)
    } else {
        bind_address
            .parse()
            .map_err(|_| AppError::InvalidBindAddress(bind_address.clone()))?
    };
    let addr = SocketAddr::from((bind_addr, port));
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    client.close().await;
    served?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
