//! Route gating for protected and public pages.
//!
//! Failures from the identity or account endpoints never surface to the
//! caller: they become redirects or the "stay" decision.

use crate::api_client::PortalApiClient;
use crate::config::PortalConfig;
use crate::credential_store::CredentialStore;
use crate::error::PortalResult;
use crate::types::{Account, EntryDecision, GateDecision, UserProfile};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves a token to a user profile.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch_profile(&self, token: &str) -> PortalResult<UserProfile>;
}

/// Lists the accounts owned by a token's user.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn fetch_accounts(&self, token: &str) -> PortalResult<Vec<Account>>;
}

#[async_trait]
impl IdentityProvider for PortalApiClient {
    async fn fetch_profile(&self, token: &str) -> PortalResult<UserProfile> {
        self.get_profile(token).await
    }
}

#[async_trait]
impl AccountDirectory for PortalApiClient {
    async fn fetch_accounts(&self, token: &str) -> PortalResult<Vec<Account>> {
        self.list_accounts(token).await
    }
}

/// Redirect targets used by the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteTargets {
    pub entry: String,
    pub balance: String,
    pub account_creation: String,
}

impl RouteTargets {
    pub fn from_config(config: &PortalConfig) -> Self {
        Self {
            entry: config.entry_path.clone(),
            balance: config.balance_path.clone(),
            account_creation: config.account_creation_path.clone(),
        }
    }
}

impl Default for RouteTargets {
    fn default() -> Self {
        Self::from_config(&PortalConfig::default())
    }
}

pub struct AuthGate {
    credentials: CredentialStore,
    identity: Arc<dyn IdentityProvider>,
    accounts: Arc<dyn AccountDirectory>,
    targets: RouteTargets,
}

impl AuthGate {
    pub fn new(
        credentials: CredentialStore,
        identity: Arc<dyn IdentityProvider>,
        accounts: Arc<dyn AccountDirectory>,
        targets: RouteTargets,
    ) -> Self {
        Self {
            credentials,
            identity,
            accounts,
            targets,
        }
    }

    /// Gate backed by the API client for both identity and accounts.
    pub fn with_client(credentials: CredentialStore, api: PortalApiClient) -> Self {
        let targets = RouteTargets::from_config(api.config());
        let api = Arc::new(api);
        Self::new(credentials, api.clone(), api, targets)
    }

    pub fn targets(&self) -> &RouteTargets {
        &self.targets
    }

    /// Decides whether a protected page may render.
    ///
    /// A cached profile is trusted without a network call. Otherwise the
    /// identity endpoint is asked and a successful answer is cached.
    pub async fn guard_protected(&self) -> GateDecision {
        let Some(token) = self.credentials.token() else {
            debug!("no token, redirecting to entry");
            return GateDecision::Redirect(self.targets.entry.clone());
        };

        if let Some(profile) = self.credentials.profile() {
            return GateDecision::Render(profile);
        }

        match self.identity.fetch_profile(&token).await {
            Ok(profile) => {
                self.credentials.set_profile(&profile);
                GateDecision::Render(profile)
            }
            Err(e) => {
                warn!("identity check failed, redirecting to entry: {e}");
                GateDecision::Redirect(self.targets.entry.clone())
            }
        }
    }

    /// Decides where a signed-in user landing on the entry page goes.
    pub async fn route_entry(&self) -> EntryDecision {
        let Some(token) = self.credentials.token() else {
            return EntryDecision::Stay;
        };

        match self.accounts.fetch_accounts(&token).await {
            Ok(accounts) if accounts.iter().any(Account::is_active) => {
                EntryDecision::Redirect(self.targets.balance.clone())
            }
            Ok(_) => EntryDecision::Redirect(self.targets.account_creation.clone()),
            Err(e) => {
                warn!("account lookup failed, staying on entry page: {e}");
                EntryDecision::Stay
            }
        }
    }

    /// Whether the user owns at least one active account. False on any error.
    pub async fn has_active_account(&self) -> bool {
        let Some(token) = self.credentials.token() else {
            return false;
        };

        match self.accounts.fetch_accounts(&token).await {
            Ok(accounts) => accounts.iter().any(Account::is_active),
            Err(e) => {
                debug!("account lookup failed: {e}");
                false
            }
        }
    }
}
