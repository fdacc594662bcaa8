//! Portal error types.

use thiserror::Error;

/// Result type for portal operations.
pub type PortalResult<T> = Result<T, PortalError>;

/// Errors that can occur while talking to the banking API or managing a session.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("authentication required")]
    AuthRequired,

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("request failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] ebank_crypto::CryptoError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PortalError {
    /// Whether a failed attempt is worth repeating.
    pub fn is_transient(&self) -> bool {
        match self {
            PortalError::Timeout(_) => true,
            PortalError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}
