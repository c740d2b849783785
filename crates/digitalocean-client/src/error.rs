//! DigitalOcean client errors

use thiserror::Error;

/// Errors that can occur when interacting with the DigitalOcean API
#[derive(Debug, Error)]
pub enum DigitalOceanError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// DigitalOcean API returned an error
    #[error("DigitalOcean API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid or expired token)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}
