//! Portal configuration.
//!
//! Read once at process start and never mutated afterwards. Values come from
//! `EBANK_*` environment variables; anything unset keeps its default.

use crate::error::{PortalError, PortalResult};
use ebank_crypto::{FieldEncryptor, FieldKey, KeyRing, KeyRingEncryptor, PassthroughEncryptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the portal core.
#[derive(Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Base URL of the core-banking API (e.g., "https://api.ebank.example").
    pub api_base_url: String,

    /// Encrypt sensitive fields before sending. Off means passthrough.
    pub secure_mode: bool,

    /// Server-side field key, base64-encoded raw bytes.
    pub field_key: Option<String>,

    /// Identifier stamped on payloads encrypted with `field_key`.
    pub field_key_id: String,

    /// Retired server keys by id, kept so older payloads still decrypt.
    #[serde(default)]
    pub retired_field_keys: BTreeMap<String, String>,

    /// Key handed to client code, separate from the server key.
    pub client_field_key: Option<String>,

    /// Identifier stamped on payloads encrypted with `client_field_key`.
    /// The server ring also registers the client key under this id.
    #[serde(default = "default_client_field_key_id")]
    pub client_field_key_id: String,

    /// Per-attempt request timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Extra attempts after the first for transient failures.
    pub max_retries: u32,

    /// First backoff delay in milliseconds; doubles on each retry.
    pub retry_base_delay_ms: u64,

    /// How often the credential monitor re-reads durable storage (milliseconds).
    pub credential_poll_interval_ms: u64,

    /// Public entry page unauthenticated users are sent to.
    pub entry_path: String,

    /// Where an authenticated user with an active account lands.
    pub balance_path: String,

    /// Where an authenticated user without an active account lands.
    pub account_creation_path: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            secure_mode: false,
            field_key: None,
            field_key_id: "v1".to_string(),
            retired_field_keys: BTreeMap::new(),
            client_field_key: None,
            client_field_key_id: default_client_field_key_id(),
            request_timeout_ms: 10_000,
            max_retries: 2,
            retry_base_delay_ms: 250,
            credential_poll_interval_ms: 5_000,
            entry_path: "/".to_string(),
            balance_path: "/accounts/balance".to_string(),
            account_creation_path: "/accounts/open".to_string(),
        }
    }
}

impl fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "<redacted>");
        f.debug_struct("PortalConfig")
            .field("api_base_url", &self.api_base_url)
            .field("secure_mode", &self.secure_mode)
            .field("field_key", &redact(&self.field_key))
            .field("field_key_id", &self.field_key_id)
            .field("retired_field_keys", &self.retired_field_keys.keys().collect::<Vec<_>>())
            .field("client_field_key", &redact(&self.client_field_key))
            .field("client_field_key_id", &self.client_field_key_id)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("credential_poll_interval_ms", &self.credential_poll_interval_ms)
            .field("entry_path", &self.entry_path)
            .field("balance_path", &self.balance_path)
            .field("account_creation_path", &self.account_creation_path)
            .finish()
    }
}

impl PortalConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> PortalResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Recognised variables: `EBANK_API_BASE_URL`, `EBANK_SECURE_MODE`,
    /// `EBANK_FIELD_KEY`, `EBANK_FIELD_KEY_ID`, `EBANK_RETIRED_FIELD_KEYS`
    /// (`id=base64;id=base64`), `EBANK_CLIENT_FIELD_KEY`, `EBANK_CLIENT_FIELD_KEY_ID`,
    /// `EBANK_REQUEST_TIMEOUT_MS`, `EBANK_MAX_RETRIES`,
    /// `EBANK_RETRY_BASE_DELAY_MS`, `EBANK_CREDENTIAL_POLL_INTERVAL_MS`,
    /// `EBANK_ENTRY_PATH`, `EBANK_BALANCE_PATH`, `EBANK_ACCOUNT_CREATION_PATH`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PortalResult<Self> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(v) = get("EBANK_API_BASE_URL") {
            config.api_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("EBANK_SECURE_MODE") {
            config.secure_mode = parse_flag("EBANK_SECURE_MODE", &v)?;
        }
        config.field_key = get("EBANK_FIELD_KEY");
        if let Some(v) = get("EBANK_FIELD_KEY_ID") {
            config.field_key_id = v;
        }
        if let Some(v) = get("EBANK_RETIRED_FIELD_KEYS") {
            config.retired_field_keys = parse_key_list(&v)?;
        }
        config.client_field_key = get("EBANK_CLIENT_FIELD_KEY");
        if let Some(v) = get("EBANK_CLIENT_FIELD_KEY_ID") {
            config.client_field_key_id = v;
        }
        if let Some(v) = get("EBANK_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = parse_positive("EBANK_REQUEST_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("EBANK_MAX_RETRIES") {
            config.max_retries = parse_number("EBANK_MAX_RETRIES", &v)?;
        }
        if let Some(v) = get("EBANK_RETRY_BASE_DELAY_MS") {
            config.retry_base_delay_ms = parse_number("EBANK_RETRY_BASE_DELAY_MS", &v)?;
        }
        if let Some(v) = get("EBANK_CREDENTIAL_POLL_INTERVAL_MS") {
            config.credential_poll_interval_ms = parse_positive("EBANK_CREDENTIAL_POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = get("EBANK_ENTRY_PATH") {
            config.entry_path = v;
        }
        if let Some(v) = get("EBANK_BALANCE_PATH") {
            config.balance_path = v;
        }
        if let Some(v) = get("EBANK_ACCOUNT_CREATION_PATH") {
            config.account_creation_path = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects zero timeouts and key ids that name two different keys.
    pub fn validate(&self) -> PortalResult<()> {
        if self.request_timeout_ms == 0 {
            return Err(PortalError::Config("request_timeout_ms must be greater than zero".to_string()));
        }
        if self.credential_poll_interval_ms == 0 {
            return Err(PortalError::Config(
                "credential_poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(encoded) = &self.field_key {
            self.server_key_ring(parse_key(&self.field_key_id, encoded)?)?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn credential_poll_interval(&self) -> Duration {
        Duration::from_millis(self.credential_poll_interval_ms)
    }

    /// Builds the server-side field encryptor.
    ///
    /// Secure mode off gives a passthrough encryptor. Secure mode on without a
    /// key gives an encryptor whose encrypt calls fail and whose decrypts leave
    /// payloads untouched. A key that is present but unparsable is an error.
    pub fn server_encryptor(&self) -> PortalResult<Arc<dyn FieldEncryptor>> {
        self.build_encryptor(&self.field_key_id, self.field_key.as_deref(), true)
    }

    /// Builds the encryptor for client code from `client_field_key`, stamped
    /// with `client_field_key_id`.
    ///
    /// Never falls back to the server key.
    pub fn client_encryptor(&self) -> PortalResult<Arc<dyn FieldEncryptor>> {
        self.build_encryptor(&self.client_field_key_id, self.client_field_key.as_deref(), false)
    }

    fn build_encryptor(
        &self,
        key_id: &str,
        key: Option<&str>,
        server_side: bool,
    ) -> PortalResult<Arc<dyn FieldEncryptor>> {
        if !self.secure_mode {
            return Ok(Arc::new(PassthroughEncryptor));
        }

        let Some(encoded) = key else {
            tracing::warn!(key_id = %key_id, "secure mode enabled without a field key");
            return Ok(Arc::new(KeyRingEncryptor::unconfigured(key_id)));
        };

        let active = parse_key(key_id, encoded)?;
        let ring = if server_side {
            self.server_key_ring(active)?
        } else {
            KeyRing::new(key_id, active)
        };
        Ok(Arc::new(KeyRingEncryptor::new(Arc::new(ring))))
    }

    /// Server ring: the active key, every retired key, and the client key
    /// so payloads encrypted by client code open on the server.
    fn server_key_ring(&self, active: FieldKey) -> PortalResult<KeyRing> {
        let mut ring = KeyRing::new(self.field_key_id.clone(), active);

        let client = self
            .client_field_key
            .as_ref()
            .map(|encoded| (&self.client_field_key_id, encoded));
        for (id, encoded) in self.retired_field_keys.iter().chain(client) {
            let key = parse_key(id, encoded)?;
            let same_bytes = ring
                .resolve(id)
                .ok()
                .map(|existing| existing.as_bytes() == key.as_bytes());
            match same_bytes {
                Some(true) => {}
                Some(false) => {
                    return Err(PortalError::Config(format!(
                        "key id {id:?} is assigned to two different field keys"
                    )));
                }
                None => ring = ring.with_retired(id.clone(), key),
            }
        }
        Ok(ring)
    }
}

fn default_client_field_key_id() -> String {
    "client-v1".to_string()
}

fn parse_key(key_id: &str, encoded: &str) -> PortalResult<FieldKey> {
    FieldKey::from_base64(encoded)
        .map_err(|e| PortalError::Config(format!("field key {key_id:?}: {e}")))
}

fn parse_flag(name: &str, value: &str) -> PortalResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(PortalError::Config(format!("{name}: expected a boolean, got {other:?}"))),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> PortalResult<T> {
    value
        .parse()
        .map_err(|_| PortalError::Config(format!("{name}: expected a number, got {value:?}")))
}

fn parse_positive(name: &str, value: &str) -> PortalResult<u64> {
    match parse_number(name, value)? {
        0 => Err(PortalError::Config(format!("{name}: must be greater than zero"))),
        n => Ok(n),
    }
}

fn parse_key_list(value: &str) -> PortalResult<BTreeMap<String, String>> {
    let mut keys = BTreeMap::new();
    for entry in value.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (id, key) = entry.split_once('=').ok_or_else(|| {
            PortalError::Config("EBANK_RETIRED_FIELD_KEYS: expected id=base64 entries".to_string())
        })?;
        keys.insert(id.trim().to_string(), key.trim().to_string());
    }
    Ok(keys)
}
