//! Transport types
//!
//! Common types shared across transport implementations.

use async_trait::async_trait;

/// Transport-level errors, before classification into user-facing outcomes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// Network error (connection refused, timeout, TLS, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP error (non-2xx status), message is the upstream body
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Configuration error (bad URL, client build failure)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(String),
}

impl AdapterError {
    /// HTTP status, if the upstream answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            AdapterError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Json(err.to_string())
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AdapterError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_builder() => AdapterError::Configuration(err.to_string()),
            None => AdapterError::Network(err.to_string()),
        }
    }
}

/// Asynchronous HTTP transport
///
/// Abstraction over the HTTP client so adapters can be tested with
/// `FakeTransport`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST a JSON body and return the response body.
    ///
    /// Non-2xx answers come back as `AdapterError::Http` with the body text.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, AdapterError>;
}
