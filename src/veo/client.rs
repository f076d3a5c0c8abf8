//! Veo proxy client
//!
//! Intercepts requests bound for Vertex AI model endpoints and sends them
//! to the simplified proxy paths instead:
//!
//! ```text
//! ...:predictLongRunning    --> [reshape body] --> POST /generate-video
//! ...:fetchPredictOperation --> [body as-is]   --> POST /check-operation
//! anything else             --> [body as-is]   --> <method> <endpoint>
//!                                                        |
//!                                   2xx: decode T <------+------> else: VeoError::Http
//! ```
//!
//! Each call is one request and one response. Nothing is retried.

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::config::ProxyConfig;
use crate::error::{Error, Result, VeoError};
use crate::veo::types::{
    FetchOperationRequest, LongRunningOperation, Operation, OperationStatus,
    SimplifiedVideoRequest, VeoModel, VideoGenerationRequest,
};

/// Fallback error text when the response body is not UTF-8
const UNKNOWN_ERROR: &str = "Unknown error";

/// Client for a Veo proxy server.
#[derive(Debug, Clone)]
pub struct VeoClient {
    http: reqwest::Client,
    config: ProxyConfig,
}

impl VeoClient {
    /// Create a client from configuration.
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Create a client that reuses an existing HTTP client.
    pub fn with_http_client(config: ProxyConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Active configuration
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Build the absolute URL for a path on the proxy host.
    pub fn url_for(&self, path: &str) -> std::result::Result<Url, VeoError> {
        let raw = format!("{}{}", self.config.base_url, path);
        Url::parse(&raw).map_err(|e| VeoError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    /// Start a video generation with the given model.
    pub async fn generate_video(
        &self,
        model: VeoModel,
        request: &VideoGenerationRequest,
    ) -> std::result::Result<LongRunningOperation, VeoError> {
        let endpoint = model.predict_endpoint(&self.config.project_id, &self.config.region);
        self.perform_request(&endpoint, Method::POST, Some(request))
            .await
    }

    /// Poll a long-running generation.
    ///
    /// The model is inferred from the operation name.
    pub async fn fetch_operation(
        &self,
        request: &FetchOperationRequest,
    ) -> std::result::Result<OperationStatus, VeoError> {
        let model = VeoModel::from_operation_name(&request.operation_name);
        let endpoint = model.fetch_endpoint(&self.config.project_id, &self.config.region);
        self.perform_request(&endpoint, Method::POST, Some(request))
            .await
    }

    /// Send a request for `endpoint`, rerouting the two long-running
    /// operations to the proxy's simplified paths.
    ///
    /// `method` only applies to pass-through requests; rerouted requests
    /// are always POSTed.
    #[instrument(skip(self, body), fields(base_url = %self.config.base_url))]
    pub async fn perform_request<T, B>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> std::result::Result<T, VeoError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let operation = Operation::classify(endpoint);
        let body = body.map(encode).transpose()?;

        let (method, body) = match operation {
            Operation::PredictLongRunning => (Method::POST, body.and_then(simplify)),
            Operation::FetchPredictOperation => (Method::POST, body),
            Operation::Passthrough(_) => (method, body),
        };

        self.send(method, operation.proxy_path(), body.as_ref())
            .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> std::result::Result<T, VeoError> {
        let url = self.url_for(path)?;
        debug!(url = %url, method = %method, "Sending proxy request");

        let mut request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| VeoError::InvalidResponse(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| VeoError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            let message =
                String::from_utf8(bytes.to_vec()).unwrap_or_else(|_| UNKNOWN_ERROR.to_string());
            error!(status = %status, body = %message, path, "Proxy request failed");
            return Err(VeoError::Http {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = %status, len = bytes.len(), "Proxy request succeeded");
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> std::result::Result<Value, VeoError> {
    serde_json::to_value(body).map_err(|e| VeoError::Encode(e.to_string()))
}

/// Reshape a `:predictLongRunning` body into the proxy's flattened form.
///
/// A body that is not a generation request is dropped, matching how the
/// proxy treats a request with no body.
fn simplify(body: Value) -> Option<Value> {
    match serde_json::from_value::<VideoGenerationRequest>(body) {
        Ok(request) => {
            let simplified = SimplifiedVideoRequest::from(&request);
            serde_json::to_value(simplified).ok()
        }
        Err(e) => {
            warn!(error = %e, "Body is not a video generation request; sending none");
            None
        }
    }
}
