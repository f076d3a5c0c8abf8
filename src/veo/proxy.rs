//! Veo proxy server
//!
//! Serves the flattened endpoints [`VeoClient`](crate::veo::VeoClient)
//! talks to and forwards each call to Vertex AI:
//!
//! ```text
//! POST /generate-video  --> [fill defaults]         --> <model>:predictLongRunning
//! POST /check-operation --> [model from operation]  --> <model>:fetchPredictOperation
//!                                                              |
//!                    2xx: upstream JSON as-is <----------------+------> else: {error, status_code, message}
//! ```

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};

use crate::config::VertexConfig;
use crate::error::{Error, Result};
use crate::handlers::error_response;
use crate::veo::types::{
    FetchOperationRequest, SimplifiedVideoRequest, VeoModel, CHECK_OPERATION_PATH,
    GENERATE_VIDEO_PATH,
};

/// Shared state for the proxy endpoints
#[derive(Debug, Clone)]
pub struct ProxyState {
    http: reqwest::Client,
    config: VertexConfig,
}

impl ProxyState {
    /// Create proxy state with its own HTTP client.
    pub fn new(config: VertexConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Create proxy state that reuses an existing HTTP client.
    pub fn with_http_client(config: VertexConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Upstream configuration
    pub fn config(&self) -> &VertexConfig {
        &self.config
    }

    /// POST `body` to `endpoint` on Vertex AI and relay the answer.
    async fn forward<B: Serialize>(&self, endpoint: &str, body: &B, failure: &str) -> Response {
        let url = format!("{}{}", self.config.base_url(), endpoint);
        debug!(url = %url, "Forwarding to Vertex AI");

        let mut request = self.http.post(&url).json(body);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(url = %url, error = %e, "Vertex AI request failed");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                error!(url = %url, error = %e, "Failed to read Vertex AI response");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
            }
        };

        if !status.is_success() {
            error!(status = %status, body = %text, "Vertex AI returned an error");
            return (
                status,
                Json(json!({
                    "error": failure,
                    "status_code": status.as_u16(),
                    "message": text,
                })),
            )
                .into_response();
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(result) => (StatusCode::OK, Json(result)).into_response(),
            Err(e) => {
                error!(error = %e, "Vertex AI response is not JSON");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            }
        }
    }
}

/// Parse a request body as a non-empty JSON object.
fn json_object(body: &Bytes) -> Option<Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) if value.as_object().is_some_and(|o| !o.is_empty()) => Some(value),
        _ => None,
    }
}

/// Start a generation from a flattened request.
///
/// # Route
/// `POST /generate-video`
///
/// Missing parameters get the proxy defaults; the request goes to the
/// default model.
#[instrument(skip_all)]
pub async fn generate_video_handler(State(state): State<Arc<ProxyState>>, body: Bytes) -> Response {
    let Some(value) = json_object(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "No data provided");
    };

    let simplified: SimplifiedVideoRequest = match serde_json::from_value(value) {
        Ok(simplified) => simplified,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("Invalid request: {}", e))
        }
    };

    let model = VeoModel::default();
    let request = simplified.into_generation_request();
    let endpoint = model.predict_endpoint(&state.config.project_id, &state.config.region);

    info!(model = %model, "Generate video request");
    state
        .forward(&endpoint, &request, "Failed to generate video")
        .await
}

/// Poll a generation by operation name.
///
/// # Route
/// `POST /check-operation`
#[instrument(skip_all)]
pub async fn check_operation_handler(
    State(state): State<Arc<ProxyState>>,
    body: Bytes,
) -> Response {
    let operation_name = json_object(&body).and_then(|value| {
        value
            .get("operationName")
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    let Some(operation_name) = operation_name else {
        return error_response(StatusCode::BAD_REQUEST, "operationName is required");
    };

    let model = VeoModel::from_operation_name(&operation_name);
    let endpoint = model.fetch_endpoint(&state.config.project_id, &state.config.region);

    info!(model = %model, operation = %operation_name, "Check operation request");
    state
        .forward(
            &endpoint,
            &FetchOperationRequest::new(operation_name),
            "Failed to check operation status",
        )
        .await
}

/// Create the proxy router.
///
/// # Routes
/// - `POST /generate-video`
/// - `POST /check-operation`
pub fn proxy_router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route(GENERATE_VIDEO_PATH, post(generate_video_handler))
        .route(CHECK_OPERATION_PATH, post(check_operation_handler))
        .with_state(state)
}
