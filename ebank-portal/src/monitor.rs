//! Polls the shared credential store for sign-in/sign-out from other tabs.
//!
//! The durable store has no change events, so a background task re-reads it
//! on an interval and publishes the authenticated flag whenever it flips.

use crate::credential_store::CredentialStore;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Floor for the poll period; `tokio::time::interval` rejects zero.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct CredentialMonitor {
    rx: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl CredentialMonitor {
    /// Starts polling `store` every `interval` (at least
    /// [`MIN_POLL_INTERVAL`]). Must be called inside a tokio runtime.
    pub fn spawn(store: CredentialStore, interval: Duration) -> Self {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let (tx, rx) = watch::channel(store.is_authenticated());

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick fires immediately; the initial value is already sent.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let authenticated = store.is_authenticated();
                let changed = tx.send_if_modified(|current| {
                    if *current == authenticated {
                        false
                    } else {
                        *current = authenticated;
                        true
                    }
                });
                if changed {
                    info!(authenticated, "credential state changed");
                }
                if tx.is_closed() {
                    debug!("credential monitor has no subscribers, stopping");
                    break;
                }
            }
        });

        Self { rx, task }
    }

    /// Last observed authenticated flag.
    pub fn is_authenticated(&self) -> bool {
        *self.rx.borrow()
    }

    /// A receiver that is notified whenever the flag flips.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for CredentialMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
