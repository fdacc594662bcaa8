//! The split-tag JSON envelope exchanged between browser and server.
//!
//! Wire format: `{ "iv": "<b64>", "ct": "<b64>", "tag": "<b64>" }`.
//!
//! The browser's WebCrypto API returns `ct || tag` while the server's cipher
//! hands the tag back separately. The envelope always keeps the two apart so
//! the format does not depend on which side produced it. An envelope without
//! a `tag` member is read as the combined form, with the tag taken from the
//! last 16 bytes of `ct`.

use crate::codec;
use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// AES-GCM nonce size in bytes.
pub const IV_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// One encrypted field value, base64-encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub iv: String,
    pub ct: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Binary parts of an envelope, validated for length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedEnvelope {
    pub iv: [u8; IV_SIZE],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

impl Envelope {
    /// Builds an envelope from raw parts.
    pub fn from_parts(iv: &[u8; IV_SIZE], ciphertext: &[u8], tag: &[u8; TAG_SIZE]) -> Self {
        Self {
            iv: codec::encode(iv),
            ct: codec::encode(ciphertext),
            tag: Some(codec::encode(tag)),
        }
    }

    /// Parses an envelope from its JSON text.
    pub fn from_json_str(json: &str) -> CryptoResult<Self> {
        match classify_str(json) {
            FieldClass::Envelope(envelope) => Ok(envelope),
            FieldClass::Malformed => Err(CryptoError::InvalidEnvelope(
                "envelope members have the wrong type".to_string(),
            )),
            FieldClass::Plain => Err(CryptoError::InvalidEnvelope(
                "value is not an encrypted envelope".to_string(),
            )),
        }
    }

    /// Parses an envelope from a JSON object or a JSON-encoded string.
    pub fn from_value(value: &Value) -> CryptoResult<Self> {
        match classify(value) {
            FieldClass::Envelope(envelope) => Ok(envelope),
            FieldClass::Malformed => Err(CryptoError::InvalidEnvelope(
                "envelope members have the wrong type".to_string(),
            )),
            FieldClass::Plain => Err(CryptoError::InvalidEnvelope(
                "value is not an encrypted envelope".to_string(),
            )),
        }
    }

    pub fn to_json_string(&self) -> CryptoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("iv".into(), Value::String(self.iv.clone()));
        map.insert("ct".into(), Value::String(self.ct.clone()));
        if let Some(tag) = &self.tag {
            map.insert("tag".into(), Value::String(tag.clone()));
        }
        Value::Object(map)
    }

    /// Decodes and validates the binary parts.
    ///
    /// Fails if `iv` is not 12 bytes, `tag` is not 16 bytes, or any member is
    /// not valid base64.
    pub fn decode(&self) -> CryptoResult<DecodedEnvelope> {
        let iv = codec::decode_exact::<IV_SIZE>("iv", &self.iv)?;
        let mut ciphertext = codec::decode("ct", &self.ct)?;

        let tag = match &self.tag {
            Some(tag) => codec::decode_exact::<TAG_SIZE>("tag", tag)?,
            None => {
                if ciphertext.len() < TAG_SIZE {
                    return Err(CryptoError::InvalidLength {
                        field: "ct",
                        expected: TAG_SIZE,
                        actual: ciphertext.len(),
                    });
                }
                let split = ciphertext.len() - TAG_SIZE;
                let mut tag = [0u8; TAG_SIZE];
                tag.copy_from_slice(&ciphertext[split..]);
                ciphertext.truncate(split);
                tag
            }
        };

        Ok(DecodedEnvelope {
            iv,
            ciphertext,
            tag,
        })
    }
}

/// How a field value should be treated before display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldClass {
    /// Not ciphertext; display as-is.
    Plain,
    /// A well-typed envelope (its contents are not yet verified).
    Envelope(Envelope),
    /// Looks like an envelope but its members have the wrong types.
    Malformed,
}

/// Classifies a value as plain data, an envelope, or a broken envelope.
///
/// Objects, and strings that parse as JSON objects, are envelopes when they
/// carry string `iv` and `ct` members (and, if present, a string `tag`).
/// They are malformed when both members are present with the wrong types, or
/// when a `tag` sits next to only one of them.
/// Scalars and ordinary strings are always plain.
pub fn classify(value: &Value) -> FieldClass {
    match value {
        Value::Object(map) => classify_object(map),
        Value::String(s) => classify_str(s),
        _ => FieldClass::Plain,
    }
}

/// True when `value` is an envelope by [`classify`].
pub fn is_envelope_shaped(value: &Value) -> bool {
    matches!(classify(value), FieldClass::Envelope(_))
}

fn classify_str(s: &str) -> FieldClass {
    if !s.trim_start().starts_with('{') {
        return FieldClass::Plain;
    }
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => classify_object(&map),
        _ => FieldClass::Plain,
    }
}

fn classify_object(map: &serde_json::Map<String, Value>) -> FieldClass {
    let iv = map.get("iv");
    let ct = map.get("ct");
    // A lone `iv` or `ct` is ordinary data unless a `tag` says otherwise.
    match (iv.is_some(), ct.is_some()) {
        (false, false) => return FieldClass::Plain,
        (true, true) => {}
        _ if !map.contains_key("tag") => return FieldClass::Plain,
        _ => return FieldClass::Malformed,
    }

    let (Some(Value::String(iv)), Some(Value::String(ct))) = (iv, ct) else {
        return FieldClass::Malformed;
    };
    let tag = match map.get("tag") {
        None | Some(Value::Null) => None,
        Some(Value::String(tag)) => Some(tag.clone()),
        Some(_) => return FieldClass::Malformed,
    };

    FieldClass::Envelope(Envelope {
        iv: iv.clone(),
        ct: ct.clone(),
        tag,
    })
}
