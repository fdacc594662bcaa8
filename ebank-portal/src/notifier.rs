//! Best-effort session-clear notification.
//!
//! Sent while the tab is being torn down, so it must never block and never
//! report back. Delivery is not guaranteed and failures are only logged.

use crate::api_client::PortalApiClient;
use tracing::debug;

/// Fire-and-forget side channel to the server.
pub trait SessionNotifier: Send + Sync {
    /// Requests that the server drop its session cookie. Returns immediately.
    fn send_best_effort(&self);
}

/// Posts to the session-clear endpoint on a detached tokio task.
pub struct HttpSessionNotifier {
    api: PortalApiClient,
}

impl HttpSessionNotifier {
    pub fn new(api: PortalApiClient) -> Self {
        Self { api }
    }
}

impl SessionNotifier for HttpSessionNotifier {
    fn send_best_effort(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("no async runtime, dropping session-clear notification");
            return;
        };

        let api = self.api.clone();
        handle.spawn(async move {
            if let Err(e) = api.clear_session().await {
                debug!("session-clear notification failed: {e}");
            }
        });
    }
}

/// Discards every notification.
pub struct NoopNotifier;

impl SessionNotifier for NoopNotifier {
    fn send_best_effort(&self) {}
}
