//! Status and health check handlers.
//!
//! - `/` - Service descriptor (name, project, supported models)
//! - `/health` - Simple health check for load balancers

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{VertexConfig, WebhookConfig, DEFAULT_PROJECT_ID, DEFAULT_SERVICE_NAME};
use crate::veo::VeoModel;

/// Server version from Cargo.toml
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Health check response for simple liveness checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status (always "healthy" if responding)
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Service descriptor served at `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Always "active" if responding
    pub status: String,
    /// Service name, configurable
    pub service: String,
    /// Crate version
    pub version: String,
    /// Google Cloud project generation requests are billed to
    pub project_id: String,
    /// Model ids the proxy accepts
    pub supported_models: Vec<String>,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            status: "active".to_string(),
            service: DEFAULT_SERVICE_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            supported_models: VeoModel::ALL.iter().map(|m| m.id().to_string()).collect(),
        }
    }
}

impl ServiceInfo {
    /// Descriptor for the given server and upstream configuration
    pub fn from_config(server: &WebhookConfig, vertex: &VertexConfig) -> Self {
        Self {
            service: server.service_name.clone(),
            project_id: vertex.project_id.clone(),
            ..Self::default()
        }
    }
}

/// Health check endpoint handler.
///
/// # Route
/// `GET /health`
#[instrument(skip_all)]
pub async fn health_handler() -> impl IntoResponse {
    debug!("Health check requested");
    (StatusCode::OK, Json(HealthResponse::default()))
}

/// Service descriptor endpoint handler.
///
/// # Route
/// `GET /`
#[instrument(skip_all)]
pub async fn info_handler(State(info): State<Arc<ServiceInfo>>) -> impl IntoResponse {
    (StatusCode::OK, Json(info.as_ref().clone()))
}

/// Create the status router.
///
/// # Routes
/// - `GET /` - Service descriptor
/// - `GET /health` - Simple health check
pub fn status_router(info: Arc<ServiceInfo>) -> Router {
    Router::new()
        .route("/", get(info_handler))
        .route("/health", get(health_handler))
        .with_state(info)
}
