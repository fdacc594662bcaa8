//! Base64 helpers shared by the envelope and key loaders.
//!
//! Everything on the wire uses the standard alphabet with padding, which is
//! what both the browser (`btoa`) and server (`Buffer#toString("base64")`)
//! sides of the portal emit.

use crate::error::{CryptoError, CryptoResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes a base64 string. `field` names the value in the error.
pub fn decode(field: &'static str, value: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(value.trim())
        .map_err(|e| CryptoError::Encoding {
            field,
            reason: e.to_string(),
        })
}

/// Decodes a base64 string that must yield exactly `N` bytes.
pub fn decode_exact<const N: usize>(field: &'static str, value: &str) -> CryptoResult<[u8; N]> {
    let bytes = decode(field, value)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidLength {
            field,
            expected: N,
            actual: bytes.len(),
        })
}
