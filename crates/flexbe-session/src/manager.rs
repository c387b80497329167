//! Bearer credential lifecycle for one client process
//!
//! The manager is the only writer of the credential store. It caches the
//! current credential, refreshes it ahead of expiry, and keeps at most one
//! token fetch in flight no matter how many callers need a credential at once.
//!
//! States: `Absent` (nothing cached), `Valid`, `Refreshing` (a fetch is in
//! flight), `Revoked` (explicitly logged out, nothing fetched since).
//!
//! A refresh runs in its own task, so a caller that gives up waiting (timeout,
//! dropped future) never cancels it for the other waiters. A revoke bumps the
//! generation counter; a refresh started under an older generation discards
//! its result instead of writing it back.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use flexbe_auth::{Credential, CredentialStore, StoreEvent, fetch_token, revoke_token};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use provider::AuthMode;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Refresh ahead of expiry by this much unless configured otherwise.
pub const DEFAULT_REFRESH_LEAD: Duration = Duration::from_secs(60);

type RefreshFuture = Shared<BoxFuture<'static, Result<Credential>>>;

/// Endpoint and timing settings for a [`TokenManager`].
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub base_url: String,
    /// Bound on each token/revoke call.
    pub timeout: Duration,
    /// A credential expiring within this window is refreshed before use.
    pub refresh_lead: Duration,
}

impl TokenSettings {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            refresh_lead: DEFAULT_REFRESH_LEAD,
        }
    }

    pub fn with_refresh_lead(mut self, lead: Duration) -> Self {
        self.refresh_lead = lead;
        self
    }
}

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Absent,
    Valid,
    Refreshing,
    Revoked,
}

impl LifecycleState {
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Absent => "absent",
            LifecycleState::Valid => "valid",
            LifecycleState::Refreshing => "refreshing",
            LifecycleState::Revoked => "revoked",
        }
    }
}

struct InFlight {
    id: u64,
    fut: RefreshFuture,
}

#[derive(Default)]
struct Inner {
    cached: Option<Credential>,
    in_flight: Option<InFlight>,
    next_flight: u64,
    /// Bumped by every revoke.
    generation: u64,
    revoked: bool,
    /// Last fetch failed transiently; the periodic check retries it.
    retry_pending: bool,
}

pub struct TokenManager {
    mode: AuthMode,
    store: Arc<dyn CredentialStore>,
    http: reqwest::Client,
    settings: TokenSettings,
    inner: Mutex<Inner>,
    /// Serializes store commits (refresh write/clear vs. revoke clear).
    commit: tokio::sync::Mutex<()>,
}

impl TokenManager {
    /// Create a manager over `store`, adopting a stored credential that has
    /// not expired yet and clearing one that has.
    ///
    /// `http` should be the same cookie-enabled client the requests use, since
    /// the token endpoint authenticates by session cookie.
    pub async fn load(
        mode: AuthMode,
        store: Arc<dyn CredentialStore>,
        http: reqwest::Client,
        settings: TokenSettings,
    ) -> Arc<Self> {
        let mut cached = None;
        if mode == AuthMode::Bearer {
            match store.read().await {
                Some(credential) if !credential.is_expired() => {
                    info!(
                        expires_in_secs = credential.remaining().as_secs(),
                        "reusing stored access token"
                    );
                    cached = Some(credential);
                }
                Some(_) => {
                    info!("stored access token expired, clearing");
                    if let Err(e) = store.clear().await {
                        warn!(error = %e, "failed to clear expired credential");
                    }
                }
                None => debug!("no stored access token"),
            }
        }

        Arc::new(Self {
            mode,
            store,
            http,
            settings,
            inner: Mutex::new(Inner {
                cached,
                ..Inner::default()
            }),
            commit: tokio::sync::Mutex::new(()),
        })
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Store changes made by other contexts.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }

    pub fn state(&self) -> LifecycleState {
        let inner = self.lock();
        if inner.in_flight.is_some() {
            LifecycleState::Refreshing
        } else if inner.revoked {
            LifecycleState::Revoked
        } else if inner.cached.as_ref().is_some_and(|c| !c.is_expired()) {
            LifecycleState::Valid
        } else {
            LifecycleState::Absent
        }
    }

    /// A credential valid beyond the refresh lead time.
    ///
    /// `None` when the client does not use bearer auth. Otherwise returns the
    /// cached credential, a fresh one found in the store, or joins a refresh.
    pub async fn get_credential(self: &Arc<Self>) -> Result<Option<Credential>> {
        if self.mode != AuthMode::Bearer {
            return Ok(None);
        }
        if let Some(credential) = self.usable_cached() {
            return Ok(Some(credential));
        }
        if let Some(credential) = self.adopt_stored().await {
            return Ok(Some(credential));
        }
        self.refresh().await.map(Some)
    }

    /// Fetch a new credential, or join the fetch already in flight.
    ///
    /// Every concurrent caller receives the same outcome, success or failure.
    pub async fn refresh(self: &Arc<Self>) -> Result<Credential> {
        self.start_refresh().await
    }

    /// Log out: clear cache and store, then revoke the token server-side.
    ///
    /// The local clear happens first, so no later `get_credential` can return
    /// the revoked token even if the remote call fails or hangs. Remote
    /// failures are logged, never returned. Calling it twice is harmless.
    pub async fn revoke(&self) {
        let cached = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.revoked = true;
            inner.retry_pending = false;
            inner.in_flight = None;
            inner.cached.take()
        };

        let stored = {
            let _commit = self.commit.lock().await;
            let stored = self.store.read().await;
            if let Err(e) = self.store.clear().await {
                warn!(error = %e, "failed to clear credential store during revoke");
            }
            stored
        };

        let Some(credential) = cached.or(stored) else {
            debug!("revoke requested with no credential held");
            return;
        };

        match revoke_token(
            &self.http,
            &self.settings.base_url,
            &credential.access_token,
            self.settings.timeout,
        )
        .await
        {
            Ok(()) => info!("access token revoked"),
            Err(e) => warn!(error = %e, "remote revoke failed, local credential already cleared"),
        }
    }

    /// Apply a change another context made to the store.
    ///
    /// A live credential is adopted without a fetch. An expired one triggers a
    /// single local refresh. A clear drops the cache.
    pub async fn reconcile(self: &Arc<Self>, event: StoreEvent) {
        if self.mode != AuthMode::Bearer {
            return;
        }
        match event {
            StoreEvent::Updated(credential) if !credential.is_expired() => {
                debug!(
                    expires_in_secs = credential.remaining().as_secs(),
                    "adopting credential written by another context"
                );
                let mut inner = self.lock();
                inner.cached = Some(credential);
                inner.revoked = false;
                inner.retry_pending = false;
            }
            StoreEvent::Updated(_) => {
                debug!("shared credential already expired, refreshing locally");
                // Failures are logged by the refresh task
                let _ = self.refresh().await;
            }
            StoreEvent::Cleared => {
                debug!("credential cleared by another context");
                self.lock().cached = None;
            }
        }
    }

    /// Re-read the store and reconcile with whatever it holds. Used when
    /// change notifications were missed.
    pub async fn resync(self: &Arc<Self>) {
        let event = match self.store.read().await {
            Some(credential) => StoreEvent::Updated(credential),
            None => StoreEvent::Cleared,
        };
        self.reconcile(event).await;
    }

    /// One periodic check: refresh if the cached credential is inside the
    /// lead window, or retry a fetch that failed transiently.
    pub async fn check(self: &Arc<Self>) {
        if self.mode != AuthMode::Bearer {
            return;
        }
        let due = {
            let inner = self.lock();
            inner.in_flight.is_none()
                && (inner.retry_pending
                    || inner
                        .cached
                        .as_ref()
                        .is_some_and(|c| c.expires_within(self.settings.refresh_lead)))
        };
        if due {
            debug!("periodic check refreshing access token");
            let _ = self.refresh().await;
        }
    }

    fn usable_cached(&self) -> Option<Credential> {
        let inner = self.lock();
        inner
            .cached
            .as_ref()
            .filter(|c| !c.expires_within(self.settings.refresh_lead))
            .cloned()
    }

    async fn adopt_stored(&self) -> Option<Credential> {
        let generation = self.lock().generation;
        let stored = self.store.read().await?;
        if stored.expires_within(self.settings.refresh_lead) {
            return None;
        }
        let mut inner = self.lock();
        if inner.generation != generation {
            return None;
        }
        debug!("adopting credential found in store");
        inner.cached = Some(stored.clone());
        inner.revoked = false;
        Some(stored)
    }

    fn start_refresh(self: &Arc<Self>) -> RefreshFuture {
        let mut inner = self.lock();
        if let Some(flight) = &inner.in_flight {
            return flight.fut.clone();
        }

        inner.next_flight += 1;
        let id = inner.next_flight;
        let generation = inner.generation;
        inner.revoked = false;

        let this = Arc::clone(self);
        let task = tokio::spawn(async move { this.run_refresh(id, generation).await });
        let fut = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(Error::Task(e.to_string())),
            }
        }
        .boxed()
        .shared();

        inner.in_flight = Some(InFlight {
            id,
            fut: fut.clone(),
        });
        fut
    }

    async fn run_refresh(&self, id: u64, generation: u64) -> Result<Credential> {
        debug!("fetching access token");
        let result = match fetch_token(&self.http, &self.settings.base_url, self.settings.timeout)
            .await
        {
            Ok(token) => {
                self.commit(generation, Credential::from_token(token.access_token))
                    .await
            }
            Err(e) => {
                self.discard(generation, e.is_unauthorized()).await;
                Err(Error::Api(e))
            }
        };

        {
            let mut inner = self.lock();
            if inner.in_flight.as_ref().is_some_and(|f| f.id == id) {
                inner.in_flight = None;
            }
        }

        match &result {
            Ok(credential) => {
                record_refresh("success");
                info!(
                    expires_in_secs = credential.remaining().as_secs(),
                    "access token refreshed"
                );
            }
            Err(Error::Revoked) => {
                record_refresh("superseded");
                debug!("refresh superseded by revoke, result discarded");
            }
            Err(e) => {
                record_refresh("failure");
                warn!(error = %e, "access token refresh failed");
            }
        }
        result
    }

    async fn commit(&self, generation: u64, credential: Credential) -> Result<Credential> {
        let _commit = self.commit.lock().await;
        let current = self.lock().generation;
        if current != generation {
            return Err(Error::Revoked);
        }
        if let Err(e) = self.store.write(&credential).await {
            warn!(error = %e, "failed to persist refreshed credential");
        }

        let mut inner = self.lock();
        if inner.generation != generation {
            return Err(Error::Revoked);
        }
        inner.cached = Some(credential.clone());
        inner.retry_pending = false;
        Ok(credential)
    }

    /// Drop the cached credential after a failed fetch.
    ///
    /// Only a terminal (unauthorized) failure clears the shared store, and not
    /// when it already holds a live credential another context wrote.
    async fn discard(&self, generation: u64, terminal: bool) {
        let _commit = self.commit.lock().await;
        let previous = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return;
            }
            inner.retry_pending = !terminal;
            inner.cached.take()
        };
        if !terminal {
            return;
        }
        if let Some(stored) = self.store.read().await
            && !stored.is_expired()
            && previous.as_ref() != Some(&stored)
        {
            debug!("store holds a newer credential, leaving it in place");
            return;
        }
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear credential after refresh failure");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn record_refresh(outcome: &'static str) {
    metrics::counter!("flexbe_token_refresh_total", "outcome" => outcome).increment(1);
}
