//! Client error types for hostdeck

use hostdeck_api::LookupError;

/// Error type for gateway and controller operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed with status {status}{}", message_suffix(.message))]
    Status {
        status: u16,
        message: Option<String>,
        body: serde_json::Value,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("service not found: {0}")]
    UnknownService(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short label of the error variant, used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Status { .. } => "status",
            ClientError::Http(_) => "http",
            ClientError::Serialization(_) => "serialization",
            ClientError::Io(_) => "io",
            ClientError::Lookup(_) => "lookup",
            ClientError::UnknownService(_) => "unknown_service",
            ClientError::Config(_) => "config",
            ClientError::Metrics(_) => "metrics",
            ClientError::Other(_) => "other",
        }
    }

    /// Parsed response body; error payload for status errors, `{"message": ...}`
    /// otherwise.
    pub fn body(&self) -> serde_json::Value {
        match self {
            ClientError::Status { body, .. } => body.clone(),
            other => serde_json::json!({ "message": other.to_string() }),
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ClientError>;
