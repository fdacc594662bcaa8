//! Error types for the field cipher.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while encrypting or decrypting field values.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("no field key configured for key id {0:?}")]
    MissingKey(String),

    #[error("invalid field key: {0}")]
    InvalidKey(String),

    #[error("invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("base64 decoding failed for {field}: {reason}")]
    Encoding { field: &'static str, reason: String },

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("decrypted value is not valid UTF-8")]
    Utf8,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
