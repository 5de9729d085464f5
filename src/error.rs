//! Error types for config loading and webhook calls

use thiserror::Error;

/// Failure to load the webhook config document
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config document not found: {0}")]
    Missing(String),

    #[error("config document unreachable: {source_ref}: {reason}")]
    Unreachable { source_ref: String, reason: String },

    #[error("config document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config document has no `webhookUrl` field")]
    MissingField,

    #[error("invalid webhook URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single webhook request (list, total count or delete)
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook responded {status}")]
    Status { status: reqwest::StatusCode },

    #[error("malformed JSON response: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl FetchError {
    /// Build an unexpected-shape error from anything displayable
    pub fn shape(message: impl Into<String>) -> Self {
        FetchError::UnexpectedShape(message.into())
    }
}
