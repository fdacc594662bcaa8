//! Secure-mode switch for field encryption.
//!
//! Callers hold an `Arc<dyn FieldEncryptor>` and never see raw keys.
//! [`KeyRingEncryptor`] is used when secure mode is on; [`PassthroughEncryptor`]
//! bypasses the field cipher entirely when it is off.

use crate::cipher::{self, AeadCipher, DetachedTagCipher};
use crate::envelope::Envelope;
use crate::error::{CryptoError, CryptoResult};
use crate::key::KeyRing;
use std::sync::Arc;

/// Encrypts and decrypts individual field values.
pub trait FieldEncryptor: Send + Sync {
    /// Whether values are actually encrypted. False for passthrough mode.
    fn is_secure(&self) -> bool;

    /// The key id stamped on new payloads, if a key is configured.
    fn active_key_id(&self) -> Option<&str>;

    /// Encrypts one field value under the active key.
    fn encrypt_field(&self, plaintext: &str) -> CryptoResult<Envelope>;

    /// Decrypts one field value under the key named by `key_id`, or the
    /// active key when the payload carries none.
    fn decrypt_field(&self, key_id: Option<&str>, envelope: &Envelope) -> CryptoResult<String>;

    /// Checks that a key for `key_id` is available without decrypting.
    fn has_key(&self, key_id: Option<&str>) -> bool;
}

/// Secure-mode encryptor backed by a [`KeyRing`].
///
/// A secure-mode encryptor may exist without keys (secure mode switched on
/// but no key provisioned); every operation then fails with
/// [`CryptoError::MissingKey`].
pub struct KeyRingEncryptor {
    ring: Option<Arc<KeyRing>>,
    missing_key_id: String,
    cipher: Box<dyn AeadCipher>,
}

impl KeyRingEncryptor {
    pub fn new(ring: Arc<KeyRing>) -> Self {
        Self {
            missing_key_id: ring.active_id().to_string(),
            ring: Some(ring),
            cipher: Box::new(DetachedTagCipher),
        }
    }

    /// Secure mode without key material.
    pub fn unconfigured(key_id: impl Into<String>) -> Self {
        Self {
            ring: None,
            missing_key_id: key_id.into(),
            cipher: Box::new(DetachedTagCipher),
        }
    }

    /// Swaps the AES-GCM back-end (e.g. the browser-style combined-tag one).
    pub fn with_cipher(mut self, cipher: impl AeadCipher + 'static) -> Self {
        self.cipher = Box::new(cipher);
        self
    }

    fn ring(&self) -> CryptoResult<&KeyRing> {
        self.ring
            .as_deref()
            .ok_or_else(|| CryptoError::MissingKey(self.missing_key_id.clone()))
    }
}

impl FieldEncryptor for KeyRingEncryptor {
    fn is_secure(&self) -> bool {
        true
    }

    fn active_key_id(&self) -> Option<&str> {
        self.ring.as_deref().map(KeyRing::active_id)
    }

    fn encrypt_field(&self, plaintext: &str) -> CryptoResult<Envelope> {
        let ring = self.ring()?;
        cipher::encrypt_with(self.cipher.as_ref(), plaintext, ring.active())
    }

    fn decrypt_field(&self, key_id: Option<&str>, envelope: &Envelope) -> CryptoResult<String> {
        let ring = self.ring()?;
        let key = match key_id {
            Some(id) => ring.resolve(id)?,
            None => ring.active(),
        };
        cipher::decrypt_with(self.cipher.as_ref(), envelope, key)
    }

    fn has_key(&self, key_id: Option<&str>) -> bool {
        match (self.ring.as_deref(), key_id) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(ring), Some(id)) => ring.resolve(id).is_ok(),
        }
    }
}

/// No-op encryptor for insecure mode. Values pass through unchanged.
pub struct PassthroughEncryptor;

impl FieldEncryptor for PassthroughEncryptor {
    fn is_secure(&self) -> bool {
        false
    }

    fn active_key_id(&self) -> Option<&str> {
        None
    }

    fn encrypt_field(&self, _plaintext: &str) -> CryptoResult<Envelope> {
        Err(CryptoError::Encryption(
            "secure mode is disabled; field values are sent in the clear".to_string(),
        ))
    }

    fn decrypt_field(&self, _key_id: Option<&str>, _envelope: &Envelope) -> CryptoResult<String> {
        Err(CryptoError::Decryption(
            "secure mode is disabled; no key is available".to_string(),
        ))
    }

    fn has_key(&self, _key_id: Option<&str>) -> bool {
        false
    }
}
