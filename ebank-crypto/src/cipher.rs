//! AES-256-GCM field encryption behind the [`AeadCipher`] seam.
//!
//! Two back-ends exist because the two halves of the portal talk to AES-GCM
//! through different native APIs:
//!
//! - [`CombinedTagCipher`] mirrors the browser API, which returns and expects
//!   `ciphertext || tag` as one buffer.
//! - [`DetachedTagCipher`] mirrors the server API, which hands the tag back
//!   separately and takes it as a separate argument on decrypt.
//!
//! Both produce and consume the same split-tag [`Envelope`], so either side
//! can open what the other sealed.

use crate::envelope::{DecodedEnvelope, Envelope, IV_SIZE, TAG_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::key::FieldKey;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use serde_json::Value;
use zeroize::Zeroize;

/// Output of a seal operation with the tag already split off.
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

/// An AES-256-GCM implementation that speaks the split-tag envelope format.
pub trait AeadCipher: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Encrypts `plaintext` under `key` and `iv`.
    fn seal(&self, key: &FieldKey, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> CryptoResult<Sealed>;

    /// Authenticates and decrypts. Never returns unauthenticated bytes.
    fn open(&self, key: &FieldKey, envelope: &DecodedEnvelope) -> CryptoResult<Vec<u8>>;
}

fn new_cipher(key: &FieldKey) -> CryptoResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

fn decryption_failed() -> CryptoError {
    CryptoError::Decryption("authentication failed (wrong key or tampered data)".to_string())
}

/// Browser-style back-end: the primitive works on `ct || tag`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CombinedTagCipher;

impl AeadCipher for CombinedTagCipher {
    fn name(&self) -> &'static str {
        "combined-tag"
    }

    fn seal(&self, key: &FieldKey, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> CryptoResult<Sealed> {
        let cipher = new_cipher(key)?;
        let mut combined = cipher
            .encrypt(Nonce::from_slice(iv), plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        if combined.len() < TAG_SIZE {
            return Err(CryptoError::Encryption("cipher output shorter than tag".to_string()));
        }
        let split = combined.len() - TAG_SIZE;
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&combined[split..]);
        combined.truncate(split);

        Ok(Sealed {
            ciphertext: combined,
            tag,
        })
    }

    fn open(&self, key: &FieldKey, envelope: &DecodedEnvelope) -> CryptoResult<Vec<u8>> {
        let cipher = new_cipher(key)?;
        let mut combined = Vec::with_capacity(envelope.ciphertext.len() + TAG_SIZE);
        combined.extend_from_slice(&envelope.ciphertext);
        combined.extend_from_slice(&envelope.tag);

        cipher
            .decrypt(Nonce::from_slice(&envelope.iv), combined.as_slice())
            .map_err(|_| decryption_failed())
    }
}

/// Server-style back-end: the primitive takes and returns the tag separately.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedTagCipher;

impl AeadCipher for DetachedTagCipher {
    fn name(&self) -> &'static str {
        "detached-tag"
    }

    fn seal(&self, key: &FieldKey, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> CryptoResult<Sealed> {
        let cipher = new_cipher(key)?;
        let mut buffer = plaintext.to_vec();
        let tag = match cipher.encrypt_in_place_detached(Nonce::from_slice(iv), b"", &mut buffer) {
            Ok(tag) => tag,
            Err(e) => {
                buffer.zeroize();
                return Err(CryptoError::Encryption(e.to_string()));
            }
        };

        let mut tag_bytes = [0u8; TAG_SIZE];
        tag_bytes.copy_from_slice(&tag);
        Ok(Sealed {
            ciphertext: buffer,
            tag: tag_bytes,
        })
    }

    fn open(&self, key: &FieldKey, envelope: &DecodedEnvelope) -> CryptoResult<Vec<u8>> {
        let cipher = new_cipher(key)?;
        let mut buffer = envelope.ciphertext.clone();
        // On a tag mismatch the buffer may already hold keystream-applied bytes.
        if cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(&envelope.iv),
                b"",
                &mut buffer,
                GenericArray::from_slice(&envelope.tag),
            )
            .is_err()
        {
            buffer.zeroize();
            return Err(decryption_failed());
        }
        Ok(buffer)
    }
}

/// Generates a fresh random 12-byte IV.
pub fn generate_iv() -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    rand::rng().fill_bytes(&mut iv);
    iv
}

/// Encrypts a string field with the given back-end.
pub fn encrypt_with(cipher: &dyn AeadCipher, plaintext: &str, key: &FieldKey) -> CryptoResult<Envelope> {
    let iv = generate_iv();
    let sealed = cipher.seal(key, &iv, plaintext.as_bytes())?;
    Ok(Envelope::from_parts(&iv, &sealed.ciphertext, &sealed.tag))
}

/// Decrypts an envelope with the given back-end.
pub fn decrypt_with(cipher: &dyn AeadCipher, envelope: &Envelope, key: &FieldKey) -> CryptoResult<String> {
    let decoded = envelope.decode()?;
    let plaintext = cipher.open(key, &decoded)?;
    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        CryptoError::Utf8
    })
}

/// Encrypts a string field using the server-style back-end.
pub fn encrypt(plaintext: &str, key: &FieldKey) -> CryptoResult<Envelope> {
    encrypt_with(&DetachedTagCipher, plaintext, key)
}

/// Decrypts an envelope using the server-style back-end.
pub fn decrypt(envelope: &Envelope, key: &FieldKey) -> CryptoResult<String> {
    decrypt_with(&DetachedTagCipher, envelope, key)
}

/// Decrypts an envelope given as a JSON object or a JSON-encoded string.
pub fn decrypt_value(value: &Value, key: &FieldKey) -> CryptoResult<String> {
    decrypt(&Envelope::from_value(value)?, key)
}

/// Decrypts an envelope given as JSON text.
pub fn decrypt_json(json: &str, key: &FieldKey) -> CryptoResult<String> {
    decrypt(&Envelope::from_json_str(json)?, key)
}
