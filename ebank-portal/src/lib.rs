//! Session lifecycle core for the e-banking portal.
//!
//! Provides:
//! - Per-tab refresh-versus-close detection over tab-scoped storage
//! - Durable credential storage with a token cookie mirror
//! - Route gating against the identity and account endpoints
//! - A retrying API client and a best-effort session-clear notifier
//! - Cross-tab credential polling
//! - Configuration loading, including the field cipher's keys

pub mod api_client;
pub mod auth_gate;
pub mod config;
pub mod credential_store;
pub mod error;
pub mod monitor;
pub mod notifier;
pub mod session;
pub mod storage;
pub mod telemetry;
pub mod types;

pub use api_client::PortalApiClient;
pub use auth_gate::{AccountDirectory, AuthGate, IdentityProvider, RouteTargets};
pub use config::PortalConfig;
pub use credential_store::CredentialStore;
pub use error::{PortalError, PortalResult};
pub use monitor::CredentialMonitor;
pub use notifier::{HttpSessionNotifier, NoopNotifier, SessionNotifier};
pub use session::{
    KeyPress, LifecycleEvent, LifecycleState, SessionFlags, SessionLifecycle, TeardownOutcome,
};
pub use storage::{KeyValueStorage, MemoryStorage};
pub use telemetry::init_tracing;
pub use types::*;
