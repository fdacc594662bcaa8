//! HTTP client for the core-banking API.
//!
//! Every call is bounded by a per-attempt timeout; dropping the timed-out
//! future cancels the in-flight request. Transport failures, timeouts and
//! 5xx responses are retried with exponential backoff. 4xx responses are
//! returned straight away.

use crate::config::PortalConfig;
use crate::error::{PortalError, PortalResult};
use crate::types::{Account, AccountList, UserProfile};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

pub const PROFILE_PATH: &str = "/api/users/me";
pub const ACCOUNTS_PATH: &str = "/api/accounts";
pub const SESSION_CLEAR_PATH: &str = "/api/session/clear";

/// HTTP client for the identity, account and session endpoints.
#[derive(Clone)]
pub struct PortalApiClient {
    client: Client,
    config: PortalConfig,
}

impl PortalApiClient {
    pub fn new(config: PortalConfig) -> PortalResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| PortalError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    // ── Identity ──

    /// Fetches the profile for `token`. Non-2xx means "not authenticated".
    pub async fn get_profile(&self, token: &str) -> PortalResult<UserProfile> {
        let url = self.url(PROFILE_PATH);
        let resp = self
            .send_with_retry("GET profile", || self.client.get(&url).bearer_auth(token))
            .await?;
        let resp = check_auth_status(resp, "identity endpoint")?;
        Ok(resp.json().await?)
    }

    // ── Accounts ──

    /// Lists the caller's accounts. Accepts a bare array or a `rows` wrapper.
    pub async fn list_accounts(&self, token: &str) -> PortalResult<Vec<Account>> {
        let url = self.url(ACCOUNTS_PATH);
        let resp = self
            .send_with_retry("GET accounts", || self.client.get(&url).bearer_auth(token))
            .await?;
        let resp = check_auth_status(resp, "account listing")?;
        let list: AccountList = resp.json().await?;
        Ok(list.into_accounts())
    }

    // ── Session ──

    /// Asks the server to drop its session cookie. Single attempt, no retry.
    pub async fn clear_session(&self) -> PortalResult<()> {
        let request = self
            .client
            .post(self.url(SESSION_CLEAR_PATH))
            .json(&serde_json::json!({}));
        let resp = tokio::time::timeout(self.config.request_timeout(), request.send())
            .await
            .map_err(|_| PortalError::Timeout(self.config.request_timeout_ms))??;
        resp.error_for_status()
            .map_err(|e| PortalError::Api(e.to_string()))?;
        Ok(())
    }

    /// Sends the request built by `build`, retrying transient failures.
    async fn send_with_retry(
        &self,
        label: &str,
        build: impl Fn() -> RequestBuilder,
    ) -> PortalResult<Response> {
        let attempts = self.config.max_retries + 1;
        let timeout = self.config.request_timeout();
        let mut last_error = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.backoff_delay(attempt - 1);
                debug!("{label}: retry {attempt} after {} ms", delay.as_millis());
                tokio::time::sleep(delay).await;
            }

            let result = match tokio::time::timeout(timeout, build().send()).await {
                Ok(Ok(resp)) => Ok(resp),
                Ok(Err(e)) => Err(PortalError::Http(e)),
                Err(_) => Err(PortalError::Timeout(self.config.request_timeout_ms)),
            };

            match result {
                Ok(resp) if resp.status().is_server_error() => {
                    last_error = format!("server returned {}", resp.status());
                }
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_transient() => {
                    last_error = e.to_string();
                }
                Err(e) => return Err(e),
            }
            warn!("{label}: attempt {} of {attempts} failed: {last_error}", attempt + 1);
        }

        Err(PortalError::RetriesExhausted {
            attempts,
            last_error,
        })
    }

    /// Backoff before retry number `retry` (0-based): base * 2^retry.
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        Duration::from_millis(self.config.retry_base_delay_ms.saturating_mul(factor))
    }
}

fn check_auth_status(resp: Response, what: &str) -> PortalResult<Response> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PortalError::AuthFailed(format!("{what} returned {status}")));
    }
    if !status.is_success() {
        return Err(PortalError::Api(format!("{what} returned {status}")));
    }
    Ok(resp)
}
