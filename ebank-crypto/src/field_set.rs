//! Encrypting and decrypting whole form payloads.
//!
//! Outbound, each sensitive field `name` becomes `name_json: Envelope` and the
//! payload gains one `key_id`. Inbound, every envelope is decrypted on its
//! own; a field that fails is replaced with [`ENCRYPTED_PLACEHOLDER`] so the
//! display layer never sees a ciphertext object and never loses its siblings.

use crate::encryptor::FieldEncryptor;
use crate::envelope::{FieldClass, classify};
use crate::error::CryptoResult;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Suffix marking an encrypted field in a payload.
pub const ENCRYPTED_SUFFIX: &str = "_json";

/// Payload member naming the key used for every envelope in it.
pub const KEY_ID_FIELD: &str = "key_id";

/// Shown in place of a field that could not be decrypted.
pub const ENCRYPTED_PLACEHOLDER: &str = "[encrypted data]";

/// Encrypts every field of `fields` except those named in `plain_fields`.
///
/// `null` values are left as they are. Non-string scalars are encrypted as
/// their JSON text. In passthrough mode the mapping is returned unchanged.
/// A missing key in secure mode is returned as an error rather than sending
/// the fields in the clear.
pub fn encrypt_fields(
    encryptor: &dyn FieldEncryptor,
    fields: &Map<String, Value>,
    plain_fields: &[&str],
) -> CryptoResult<Map<String, Value>> {
    if !encryptor.is_secure() {
        return Ok(fields.clone());
    }

    let mut out = Map::new();
    let mut key_id = None;

    for (name, value) in fields {
        if plain_fields.contains(&name.as_str()) || value.is_null() {
            out.insert(name.clone(), value.clone());
            continue;
        }

        let plaintext = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let envelope = encryptor.encrypt_field(&plaintext)?;
        out.insert(format!("{name}{ENCRYPTED_SUFFIX}"), envelope.to_value());

        if key_id.is_none() {
            key_id = encryptor.active_key_id().map(str::to_string);
        }
    }

    if let Some(id) = key_id {
        out.insert(KEY_ID_FIELD.to_string(), Value::String(id));
    }

    debug!(fields = out.len(), "encrypted field set");
    Ok(out)
}

/// Decrypts every envelope in `payload`.
///
/// - `name_json` holding an envelope is decrypted into `name` and removed.
/// - An envelope under any other name is decrypted in place.
/// - A field that fails to decrypt, or looks like a broken envelope, becomes
///   [`ENCRYPTED_PLACEHOLDER`].
///
/// When no key is available for the payload's `key_id` the payload is
/// returned unchanged with a warning. Passthrough mode returns it unchanged.
pub fn decrypt_fields(encryptor: &dyn FieldEncryptor, payload: &Map<String, Value>) -> Map<String, Value> {
    if !encryptor.is_secure() {
        return payload.clone();
    }

    let key_id = payload.get(KEY_ID_FIELD).and_then(Value::as_str);
    if !encryptor.has_key(key_id) {
        warn!(key_id = ?key_id, "no field key available, leaving payload encrypted");
        return payload.clone();
    }

    let mut out = Map::new();
    let mut failed = 0usize;

    for (name, value) in payload {
        let target = name
            .strip_suffix(ENCRYPTED_SUFFIX)
            .filter(|stripped| !stripped.is_empty())
            .unwrap_or(name.as_str());

        let decrypted = match classify(value) {
            FieldClass::Plain => {
                // A decrypted `name_json` wins over a plain `name`.
                out.entry(name.clone()).or_insert_with(|| value.clone());
                continue;
            }
            FieldClass::Envelope(envelope) => match encryptor.decrypt_field(key_id, &envelope) {
                Ok(plaintext) => Value::String(plaintext),
                Err(e) => {
                    debug!(field = %target, error = %e, "field decryption failed");
                    failed += 1;
                    Value::String(ENCRYPTED_PLACEHOLDER.to_string())
                }
            },
            FieldClass::Malformed => {
                debug!(field = %target, "malformed envelope");
                failed += 1;
                Value::String(ENCRYPTED_PLACEHOLDER.to_string())
            }
        };

        out.insert(target.to_string(), decrypted);
    }

    if failed > 0 {
        warn!(failed, "some fields could not be decrypted");
    }
    out
}
