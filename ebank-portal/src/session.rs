//! Per-tab session lifecycle.
//!
//! Credentials must survive a refresh but not a closed tab. The browser
//! fires the same pre-unload signal for both, so the tab keeps two markers
//! in tab-scoped storage:
//!
//! - `sessionActive`: set on every load, cleared only on a genuine close.
//! - `isRefreshing`: set when a refresh is suspected, cleared as soon as the
//!   teardown handler has looked at it.
//!
//! Teardown then decides:
//!
//! | page preserved | `isRefreshing` | `sessionActive` | outcome                 |
//! |----------------|----------------|-----------------|-------------------------|
//! | yes            | -              | -               | nothing                 |
//! | no             | set            | -               | refresh, keep session   |
//! | no             | unset          | set             | close, purge and notify |
//! | no             | unset          | unset           | nothing to do           |
//!
//! The pre-unload handler is the primary refresh signal; refresh key
//! detection only adds to it. Because pre-unload also fires on a real
//! close, a close can be taken for a refresh and leave credentials behind
//! until the next genuine close. That is accepted: an active session is
//! never destroyed by a refresh.

use crate::credential_store::CredentialStore;
use crate::notifier::SessionNotifier;
use crate::storage::KeyValueStorage;
use std::sync::Arc;
use tracing::{debug, info};

pub const SESSION_ACTIVE_KEY: &str = "sessionActive";
pub const IS_REFRESHING_KEY: &str = "isRefreshing";

const MARKER_SET: &str = "true";

/// Snapshot of the two tab markers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionFlags {
    pub session_active: bool,
    pub is_refreshing: bool,
}

impl SessionFlags {
    pub fn read(tab: &dyn KeyValueStorage) -> Self {
        Self {
            session_active: tab.get(SESSION_ACTIVE_KEY).is_some_and(|v| v == MARKER_SET),
            is_refreshing: tab.get(IS_REFRESHING_KEY).is_some_and(|v| v == MARKER_SET),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// Listening for lifecycle events.
    Armed,
    /// A pre-unload signal or refresh key combination was seen.
    RefreshSuspected,
    /// Listeners detached; further events are ignored.
    Terminated,
}

/// A key press as reported by the host's keydown listener.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// F5, or Ctrl/Cmd+R with or without Shift.
    pub fn is_refresh_gesture(&self) -> bool {
        self.key == "F5" || ((self.ctrl || self.meta) && self.key.eq_ignore_ascii_case("r"))
    }
}

/// Browser lifecycle signals the guard listens to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    BeforeUnload,
    KeyDown(KeyPress),
    /// `persisted` is true when the page goes into the back/forward cache.
    PageHide { persisted: bool },
}

/// What teardown did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeardownOutcome {
    /// Page kept for back/forward navigation; nothing touched.
    Preserved,
    /// Refresh detected; session kept, `isRefreshing` cleared.
    Refresh,
    /// Genuine close; credentials purged and the server notified.
    Closed,
    /// No active session marker; nothing to clear.
    NoSession,
}

/// The per-tab guard.
pub struct SessionLifecycle {
    tab: Arc<dyn KeyValueStorage>,
    credentials: CredentialStore,
    notifier: Arc<dyn SessionNotifier>,
    state: LifecycleState,
}

impl SessionLifecycle {
    /// Runs on every page load: marks the session active and drops any
    /// stale refresh marker.
    pub fn init(
        tab: Arc<dyn KeyValueStorage>,
        credentials: CredentialStore,
        notifier: Arc<dyn SessionNotifier>,
    ) -> Self {
        tab.set(SESSION_ACTIVE_KEY, MARKER_SET);
        tab.remove(IS_REFRESHING_KEY);
        debug!("session lifecycle armed");

        Self {
            tab,
            credentials,
            notifier,
            state: LifecycleState::Armed,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn flags(&self) -> SessionFlags {
        SessionFlags::read(self.tab.as_ref())
    }

    /// Dispatches one event. Returns the teardown outcome for `PageHide`.
    pub fn handle(&mut self, event: LifecycleEvent) -> Option<TeardownOutcome> {
        match event {
            LifecycleEvent::BeforeUnload => {
                self.on_before_unload();
                None
            }
            LifecycleEvent::KeyDown(key) => {
                self.on_key_down(&key);
                None
            }
            LifecycleEvent::PageHide { persisted } => self.on_page_hide(persisted),
        }
    }

    /// Pre-unload fires for refresh and close alike; assume refresh.
    pub fn on_before_unload(&mut self) {
        self.mark_refreshing();
    }

    pub fn on_key_down(&mut self, key: &KeyPress) {
        if key.is_refresh_gesture() {
            self.mark_refreshing();
        }
    }

    /// Teardown decision. `None` once detached.
    pub fn on_page_hide(&mut self, persisted: bool) -> Option<TeardownOutcome> {
        if self.state == LifecycleState::Terminated {
            return None;
        }

        if persisted {
            debug!("page preserved in back/forward cache");
            return Some(TeardownOutcome::Preserved);
        }

        let flags = self.flags();
        let outcome = if flags.is_refreshing {
            self.tab.remove(IS_REFRESHING_KEY);
            self.state = LifecycleState::Armed;
            debug!("teardown treated as refresh, session kept");
            TeardownOutcome::Refresh
        } else if flags.session_active {
            self.credentials.clear();
            self.tab.remove(SESSION_ACTIVE_KEY);
            self.tab.remove(IS_REFRESHING_KEY);
            self.notifier.send_best_effort();
            info!("tab closed, credentials purged");
            TeardownOutcome::Closed
        } else {
            TeardownOutcome::NoSession
        };

        Some(outcome)
    }

    /// Detaches listeners (component teardown, not tab close).
    pub fn detach(&mut self) {
        self.state = LifecycleState::Terminated;
    }

    fn mark_refreshing(&mut self) {
        if self.state == LifecycleState::Terminated {
            return;
        }
        self.tab.set(IS_REFRESHING_KEY, MARKER_SET);
        self.state = LifecycleState::RefreshSuspected;
    }
}
