//! Durable credential storage.
//!
//! The access token and cached profile live in origin-scoped storage that
//! survives a refresh and is shared by every tab (last writer wins). The
//! token is mirrored into a cookie so server-rendered checks can see it.

use crate::storage::KeyValueStorage;
use crate::types::UserProfile;
use std::sync::Arc;
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const REMEMBER_ME_KEY: &str = "rememberMe";
pub const TOKEN_COOKIE: &str = "token";

/// Token, profile and remember-me flag, plus the token cookie mirror.
#[derive(Clone)]
pub struct CredentialStore {
    durable: Arc<dyn KeyValueStorage>,
    cookies: Arc<dyn KeyValueStorage>,
}

impl CredentialStore {
    pub fn new(durable: Arc<dyn KeyValueStorage>, cookies: Arc<dyn KeyValueStorage>) -> Self {
        Self { durable, cookies }
    }

    /// Stores a fresh login.
    pub fn save(&self, token: &str, profile: Option<&UserProfile>, remember_me: bool) {
        self.durable.set(TOKEN_KEY, token);
        self.cookies.set(TOKEN_COOKIE, token);
        if let Some(profile) = profile {
            self.set_profile(profile);
        }
        if remember_me {
            self.durable.set(REMEMBER_ME_KEY, "true");
        } else {
            self.durable.remove(REMEMBER_ME_KEY);
        }
        debug!("credentials saved");
    }

    /// The stored token, if it looks usable.
    ///
    /// Empty strings and the literals `undefined`/`null` (left behind by
    /// careless writes) do not count.
    pub fn token(&self) -> Option<String> {
        self.durable
            .get(TOKEN_KEY)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && t != "undefined" && t != "null")
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The cached profile. A corrupt entry reads as absent.
    pub fn profile(&self) -> Option<UserProfile> {
        let raw = self.durable.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("ignoring unreadable cached profile: {e}");
                None
            }
        }
    }

    pub fn set_profile(&self, profile: &UserProfile) {
        match serde_json::to_string(profile) {
            Ok(json) => self.durable.set(USER_KEY, &json),
            Err(e) => warn!("failed to cache profile: {e}"),
        }
    }

    pub fn remember_me(&self) -> bool {
        self.durable.get(REMEMBER_ME_KEY).is_some_and(|v| v == "true")
    }

    /// Removes token, profile, remember-me and the token cookie.
    pub fn clear(&self) {
        self.durable.remove(TOKEN_KEY);
        self.durable.remove(USER_KEY);
        self.durable.remove(REMEMBER_ME_KEY);
        self.cookies.remove(TOKEN_COOKIE);
        debug!("credentials cleared");
    }
}
