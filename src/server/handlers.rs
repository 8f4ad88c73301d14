//! HTTP request handlers
//!
//! Contains handlers for all HTTP endpoints.

use axum::{extract::State, response::Html, Json};
use serde::Serialize;
use tracing::instrument;

use super::AppState;
use crate::collector::{ClusterInfo, NamespaceInfo};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Health status
    status: String,
    /// Application version
    version: String,
}

/// Root endpoint - displays basic info
pub async fn root(State(state): State<AppState>) -> Html<String> {
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>asinfo-exporter</title>
</head>
<body>
    <h1>asinfo-exporter</h1>
    <p>Version: {}</p>
    <ul>
        <li><a href="/health">Health Check</a></li>
        <li><a href="{}">Node statistics</a></li>
        <li><a href="{}">Namespace statistics</a></li>
    </ul>
</body>
</html>"#,
        env!("CARGO_PKG_VERSION"),
        state.config.server.info_path,
        state.config.server.namespaces_path
    );
    Html(html)
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Node statistics endpoint - runs one collection cycle
#[instrument(skip(state), name = "cluster_info_handler")]
pub async fn cluster_info(State(state): State<AppState>) -> Json<ClusterInfo> {
    Json(state.client.info().await)
}

/// Namespace statistics endpoint - runs one collection cycle
#[instrument(skip(state), name = "namespace_info_handler")]
pub async fn namespace_info(State(state): State<AppState>) -> Json<NamespaceInfo> {
    if !state.config.cluster.collect_namespaces {
        return Json(NamespaceInfo::new());
    }
    Json(state.client.namespace_info().await)
}
