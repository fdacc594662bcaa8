//! Field key material and key-id resolution.

use crate::codec;
use crate::error::{CryptoError, CryptoResult};
use std::collections::HashMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of an AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// A 256-bit symmetric field key. Zeroized on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FieldKey {
    bytes: [u8; KEY_SIZE],
}

impl FieldKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Parses a key provisioned as base64-encoded raw bytes.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let mut raw = codec::decode("key", encoded)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        if raw.len() != KEY_SIZE {
            let actual = raw.len();
            raw.zeroize();
            return Err(CryptoError::InvalidKey(format!(
                "expected {KEY_SIZE} bytes, got {actual}"
            )));
        }
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&raw);
        raw.zeroize();
        Ok(Self { bytes })
    }

    /// Generates a random key. Used for provisioning and tests.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; KEY_SIZE];
        rand::rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    pub fn to_base64(&self) -> String {
        codec::encode(&self.bytes)
    }
}

impl fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldKey(<redacted>)")
    }
}

/// Keys addressable by `key_id`: one active key used for new envelopes plus
/// any retired keys still needed to open older payloads.
#[derive(Clone, Debug)]
pub struct KeyRing {
    active_id: String,
    keys: HashMap<String, FieldKey>,
}

impl KeyRing {
    pub fn new(active_id: impl Into<String>, active: FieldKey) -> Self {
        let active_id = active_id.into();
        let mut keys = HashMap::new();
        keys.insert(active_id.clone(), active);
        Self { active_id, keys }
    }

    /// Adds a retired key that can still decrypt but is never used to encrypt.
    pub fn with_retired(mut self, key_id: impl Into<String>, key: FieldKey) -> Self {
        let key_id = key_id.into();
        if key_id != self.active_id {
            self.keys.insert(key_id, key);
        }
        self
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> &FieldKey {
        // The constructor always inserts the active key.
        &self.keys[&self.active_id]
    }

    /// Resolves a key by id.
    pub fn resolve(&self, key_id: &str) -> CryptoResult<&FieldKey> {
        self.keys
            .get(key_id)
            .ok_or_else(|| CryptoError::MissingKey(key_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
