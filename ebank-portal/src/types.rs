//! Shapes returned by the core-banking API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Account statuses that count as "active", compared case-insensitively.
pub const ACTIVE_STATUSES: &[&str] = &["active", "activated", "open", "approved"];

/// The signed-in user's profile from the identity endpoint.
///
/// Only the fields the portal core reads are typed; the rest are kept so
/// the cached copy round-trips unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A customer account as returned by the account listing endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// `None` when the API sends no status, `null`, or a non-string value.
    #[serde(
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        let Some(status) = self.status.as_deref().map(str::trim) else {
            return false;
        };
        ACTIVE_STATUSES
            .iter()
            .any(|active| status.eq_ignore_ascii_case(active))
    }
}

/// One odd row must not fail the whole listing, so anything but a string
/// reads as no status.
fn lenient_status<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(status) => Some(status),
        _ => None,
    })
}

/// The listing endpoint returns either a bare array or `{ "rows": [...] }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum AccountList {
    Bare(Vec<Account>),
    Wrapped { rows: Vec<Account> },
}

impl AccountList {
    pub fn into_accounts(self) -> Vec<Account> {
        match self {
            AccountList::Bare(accounts) | AccountList::Wrapped { rows: accounts } => accounts,
        }
    }
}

/// Where a page should go after an authentication check.
#[derive(Clone, Debug, PartialEq)]
pub enum GateDecision {
    /// Render the protected page for this user.
    Render(UserProfile),
    /// Send the user to this path instead.
    Redirect(String),
}

/// Outcome of checking the public entry page for an existing session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryDecision {
    /// Stay on the entry page.
    Stay,
    /// Navigate to this path.
    Redirect(String),
}
