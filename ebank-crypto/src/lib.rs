//! Field-level encryption for the e-banking portal.
//!
//! Sensitive form fields are encrypted one at a time with AES-256-GCM and
//! carried as small JSON envelopes:
//!
//! ```text
//! { "iv": "<12 bytes, b64>", "ct": "<ciphertext, b64>", "tag": "<16 bytes, b64>" }
//! ```
//!
//! # Layers
//!
//! 1. [`codec`]: base64 helpers.
//! 2. [`envelope`]: the wire type, length validation, and [`classify`] for
//!    deciding whether an arbitrary JSON value is ciphertext.
//! 3. [`cipher`]: the [`AeadCipher`] seam with a browser-style
//!    ([`CombinedTagCipher`]) and a server-style ([`DetachedTagCipher`])
//!    back-end that interoperate through the envelope.
//! 4. [`encryptor`]: secure mode ([`KeyRingEncryptor`]) versus passthrough.
//! 5. [`field_set`]: whole-payload encrypt/decrypt with per-field isolation.
//!
//! Keys are provisioned out of band as base64 and addressed by `key_id` so
//! payloads written under a retired key stay readable.

pub mod cipher;
pub mod codec;
pub mod encryptor;
pub mod envelope;
mod error;
pub mod field_set;
mod key;

pub use cipher::{
    AeadCipher, CombinedTagCipher, DetachedTagCipher, Sealed, decrypt, decrypt_json, decrypt_value,
    decrypt_with, encrypt, encrypt_with, generate_iv,
};
pub use encryptor::{FieldEncryptor, KeyRingEncryptor, PassthroughEncryptor};
pub use envelope::{DecodedEnvelope, Envelope, FieldClass, IV_SIZE, TAG_SIZE, classify, is_envelope_shaped};
pub use error::{CryptoError, CryptoResult};
pub use field_set::{
    ENCRYPTED_PLACEHOLDER, ENCRYPTED_SUFFIX, KEY_ID_FIELD, decrypt_fields, encrypt_fields,
};
pub use key::{FieldKey, KEY_SIZE, KeyRing};
