//! Error types for Vemix Web
//!
//! This module provides the error type hierarchy using `thiserror` for the
//! webhook schema, the Veo request adapter and configuration loading.

use thiserror::Error;

/// The main error type for Vemix Web operations
#[derive(Error, Debug)]
pub enum Error {
    /// Veo adapter errors
    #[error("Veo error: {0}")]
    Veo(#[from] VeoError),

    /// Webhook payload errors
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Webhook processing errors
    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Failures surfaced by the Veo proxy adapter.
///
/// Every variant is terminal for the call that produced it.
#[derive(Error, Debug)]
pub enum VeoError {
    /// The target URL could not be constructed
    #[error("Failed to construct URL: {0}")]
    InvalidUrl(String),

    /// No well-formed HTTP response was obtained
    #[error("Failed to get HTTP response: {0}")]
    InvalidResponse(String),

    /// The proxy answered with a non-success status
    #[error("Status code: {status} - {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw response body
        message: String,
    },

    /// The request body could not be serialized
    #[error("Failed to encode request: {0}")]
    Encode(String),

    /// The response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl VeoError {
    /// Short category label for the failure.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "Invalid URL",
            Self::InvalidResponse(_) => "Invalid response",
            Self::Http { .. } => "HTTP Error",
            Self::Encode(_) => "Encode error",
            Self::Decode(_) => "Decode error",
        }
    }

    /// HTTP status of the failed call, if the proxy answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Webhook payload decoding errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Payload is not valid JSON or does not match any event shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Unrecognised event type tag
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),
}

/// Webhook processing errors
#[derive(Error, Debug)]
pub enum WebhookError {
    /// The renewal handler reported a failure
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name
        name: String,
        /// Offending value
        value: String,
    },

    /// Base URL is not an absolute http(s) URL
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Result type alias for Vemix Web operations
pub type Result<T> = std::result::Result<T, Error>;
