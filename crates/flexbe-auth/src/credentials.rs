//! The bearer credential and the store contract
//!
//! A `CredentialStore` is one durable slot shared by every execution context
//! of the same environment (sibling processes sharing a file, sibling clients
//! sharing an in-process hub). Writes replace the whole value. Each context
//! sees the other contexts' writes as `StoreEvent`s and never its own.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

use crate::constants::FALLBACK_LIFETIME;
use crate::error::Result;
use crate::jwt;

/// Boxed future returned by store operations, for `Arc<dyn CredentialStore>`.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Current unix time in milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// A bearer token and the absolute time it stops being valid.
///
/// Persisted as `{"accessToken": "...", "expiresAt": <unix ms>}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub access_token: String,
    /// Expiration as unix timestamp in milliseconds
    pub expires_at: u64,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, expires_at: u64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Build a credential from a freshly issued token, taking the expiry from
    /// its `exp` claim. Undecodable tokens get [`FALLBACK_LIFETIME`].
    pub fn from_token(access_token: impl Into<String>) -> Self {
        let access_token = access_token.into();
        let expires_at = match jwt::expiry_millis(&access_token) {
            Ok(exp) => exp,
            Err(e) => {
                warn!(
                    error = %e,
                    fallback_secs = FALLBACK_LIFETIME.as_secs(),
                    "could not read token expiry, using fallback lifetime"
                );
                now_millis() + FALLBACK_LIFETIME.as_millis() as u64
            }
        };
        Self {
            access_token,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= now_millis()
    }

    /// True when the credential expires within `lead` from now (or already has).
    pub fn expires_within(&self, lead: Duration) -> bool {
        self.expires_at <= now_millis().saturating_add(lead.as_millis() as u64)
    }

    /// Time left before expiry, zero if already expired.
    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.expires_at.saturating_sub(now_millis()))
    }

    pub(crate) fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| crate::Error::CredentialParse(format!("serializing credential: {e}")))
    }

    /// Parse a stored value. Malformed data yields `None`.
    pub(crate) fn parse_stored(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!(error = %e, "ignoring malformed stored credential");
                None
            }
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A change made to the store by another context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Updated(Credential),
    Cleared,
}

impl StoreEvent {
    /// Event for a raw stored value; absent or malformed values read as a clear.
    pub(crate) fn from_raw(raw: Option<&str>) -> Self {
        match raw.and_then(Credential::parse_stored) {
            Some(credential) => StoreEvent::Updated(credential),
            None => StoreEvent::Cleared,
        }
    }
}

/// Durable, shared slot for one credential.
pub trait CredentialStore: Send + Sync {
    /// Current value. Never fails: unreadable or malformed data is `None`.
    fn read(&self) -> StoreFuture<'_, Option<Credential>>;

    /// Replace the stored value.
    fn write<'a>(&'a self, credential: &'a Credential) -> StoreFuture<'a, Result<()>>;

    /// Remove the stored value.
    fn clear(&self) -> StoreFuture<'_, Result<()>>;

    /// Changes made by other contexts. Own writes are not delivered.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
