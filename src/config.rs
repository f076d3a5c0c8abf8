//! Runtime configuration
//!
//! Defaults match a local development proxy. Every value can be overridden
//! from the environment (`from_env`) or programmatically (`with_*`).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Default proxy host used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default Google Cloud project the proxy forwards to
pub const DEFAULT_PROJECT_ID: &str = "daring-runway-465515-i2";

/// Default Vertex AI region
pub const DEFAULT_REGION: &str = "us-central1";

/// Default webhook receiver port
pub const DEFAULT_PORT: u16 = 5000;

/// Service name reported by `GET /`
pub const DEFAULT_SERVICE_NAME: &str = "Vertex AI Veo Proxy";

/// Configuration for the Veo proxy adapter.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Base URL of the proxy server, without a trailing slash
    pub base_url: String,
    /// Google Cloud project id used to build model endpoints
    pub project_id: String,
    /// Vertex AI region used to build model endpoints
    pub region: String,
    /// Optional request timeout; `None` keeps the HTTP client default
    pub request_timeout: Option<Duration>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            region: DEFAULT_REGION.to_string(),
            request_timeout: None,
        }
    }
}

impl ProxyConfig {
    /// Load configuration from `VEO_PROXY_URL`, `VEO_PROJECT_ID`,
    /// `VEO_REGION` and `VEO_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = env::var("VEO_PROXY_URL") {
            config = config.with_base_url(url);
        }
        if let Ok(project) = env::var("VEO_PROJECT_ID") {
            config.project_id = project;
        }
        if let Ok(region) = env::var("VEO_REGION") {
            config.region = region;
        }
        if let Some(secs) = parse_var::<u64>("VEO_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Set the proxy base URL. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the Google Cloud project id.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    /// Set the Vertex AI region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Check that the base URL parses as an absolute http(s) URL.
    ///
    /// The adapter does not require this; a bad base URL surfaces as an
    /// `InvalidUrl` failure on the first call instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            _ => Err(ConfigError::InvalidBaseUrl(self.base_url.clone())),
        }
    }
}

/// Configuration for the server that hosts the webhook receiver and the
/// proxy endpoints.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Name reported by the service descriptor
    pub service_name: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl WebhookConfig {
    /// Load configuration from `HOST`, `PORT` and `SERVICE_NAME`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var::<u16>("PORT")? {
            config.port = port;
        }
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service_name = name;
        }
        Ok(config)
    }

    /// Socket address string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upstream Vertex AI settings used by the proxy endpoints.
#[derive(Debug, Clone)]
pub struct VertexConfig {
    /// Google Cloud project generation requests are billed to
    pub project_id: String,
    /// Vertex AI region
    pub region: String,
    /// API root override; `None` uses the regional Vertex AI host
    pub base_url: Option<String>,
    /// Bearer token sent upstream
    pub access_token: Option<String>,
    /// Optional upstream request timeout
    pub request_timeout: Option<Duration>,
}

impl Default for VertexConfig {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            region: DEFAULT_REGION.to_string(),
            base_url: None,
            access_token: None,
            request_timeout: None,
        }
    }
}

impl VertexConfig {
    /// Load configuration from `PROJECT_ID`, `LOCATION`, `VERTEX_BASE_URL`,
    /// `VERTEX_ACCESS_TOKEN` and `VERTEX_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(project) = env::var("PROJECT_ID") {
            config.project_id = project;
        }
        if let Ok(region) = env::var("LOCATION") {
            config.region = region;
        }
        if let Ok(url) = env::var("VERTEX_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Ok(token) = env::var("VERTEX_ACCESS_TOKEN") {
            config.access_token = Some(token);
        }
        if let Some(secs) = parse_var::<u64>("VERTEX_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Override the API root. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Set the bearer token sent upstream.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// API root, e.g. `https://us-central1-aiplatform.googleapis.com/v1`
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{}-aiplatform.googleapis.com/v1", self.region),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
