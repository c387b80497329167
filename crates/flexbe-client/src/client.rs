//! Client facade: configuration in, ready-to-use resource APIs out

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use flexbe_auth::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use flexbe_session::{TokenManager, TokenSettings, global, spawn_check_task, spawn_sync_task};
use provider::{ApiKeyProvider, AuthMode, NoAuthProvider, Provider};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bearer::BearerProvider;
use crate::config::ClientConfig;
use crate::meta::MetaApi;
use crate::pipeline::{ApiClient, UnauthorizedHook};
use crate::site::SiteApi;

pub struct FlexbeClientBuilder {
    config: ClientConfig,
    http: Option<reqwest::Client>,
    store: Option<Arc<dyn CredentialStore>>,
    on_unauthorized: Option<UnauthorizedHook>,
    process_wide: bool,
}

impl FlexbeClientBuilder {
    /// Use this HTTP client. It must keep cookies for bearer mode to work.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Bearer mode: keep the credential here instead of `credential_path`.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn on_unauthorized(
        mut self,
        hook: impl Fn(&provider::ApiError) + Send + Sync + 'static,
    ) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    /// Bearer mode: share one token manager across every client in the
    /// process built with this flag. The first such client installs it and
    /// its background tasks live as long as the process.
    pub fn process_wide(mut self, enabled: bool) -> Self {
        self.process_wide = enabled;
        self
    }

    pub async fn build(self) -> common::Result<FlexbeClient> {
        let config = self.config;
        config.validate()?;

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .map_err(|e| common::Error::Config(format!("building HTTP client: {e}")))?,
        };

        let mut tasks = Vec::new();
        let mut tokens = None;
        let provider: Arc<dyn Provider> = match config.auth_mode {
            AuthMode::None => Arc::new(NoAuthProvider),
            AuthMode::ApiKey => {
                let key = config.api_key.clone().ok_or_else(|| {
                    common::Error::Config("API key is required for apiKey authentication".into())
                })?;
                Arc::new(ApiKeyProvider::new(key))
            }
            AuthMode::Bearer => {
                let manager = match global::get().filter(|_| self.process_wide) {
                    Some(existing) => {
                        let ignored = ignored_settings(existing.settings(), &config);
                        if ignored.is_empty() && self.store.is_none() {
                            debug!("joining process-wide token manager");
                        } else {
                            warn!(
                                ?ignored,
                                custom_store = self.store.is_some(),
                                manager_base_url = %existing.settings().base_url,
                                "joining process-wide token manager built from different settings"
                            );
                        }
                        existing
                    }
                    None => {
                        let mut own_tasks = Vec::new();
                        let store = open_store(self.store, &config, &mut own_tasks).await?;
                        let settings =
                            TokenSettings::new(config.base_url.clone(), config.timeout())
                                .with_refresh_lead(config.refresh_lead());
                        let manager =
                            TokenManager::load(AuthMode::Bearer, store, http.clone(), settings)
                                .await;
                        own_tasks.push(spawn_sync_task(manager.clone()));
                        own_tasks
                            .push(spawn_check_task(manager.clone(), config.check_interval()));

                        if self.process_wide {
                            let installed = global::init(manager.clone());
                            if !Arc::ptr_eq(&installed, &manager) {
                                // Lost the race to another client
                                own_tasks.iter().for_each(JoinHandle::abort);
                            }
                            installed
                        } else {
                            tasks = own_tasks;
                            manager
                        }
                    }
                };
                tokens = Some(manager.clone());
                Arc::new(BearerProvider::new(manager))
            }
        };

        let mut api = ApiClient::new(http, &config, provider);
        if let Some(hook) = self.on_unauthorized {
            api = api.with_unauthorized_hook(hook);
        }
        let api = Arc::new(api);

        info!(
            base_url = %config.base_url,
            auth_mode = %config.auth_mode,
            "flexbe client ready"
        );

        Ok(FlexbeClient {
            mode: config.auth_mode,
            meta: MetaApi::new(api.clone()),
            api,
            sites: Mutex::new(HashMap::new()),
            tokens,
            tasks,
        })
    }
}

/// Token settings in `config` that an already installed manager does not share.
fn ignored_settings(settings: &TokenSettings, config: &ClientConfig) -> Vec<&'static str> {
    let mut ignored = Vec::new();
    if settings.base_url != config.base_url {
        ignored.push("base_url");
    }
    if settings.timeout != config.timeout() {
        ignored.push("timeout_ms");
    }
    if settings.refresh_lead != config.refresh_lead() {
        ignored.push("refresh_lead_secs");
    }
    ignored
}

async fn open_store(
    explicit: Option<Arc<dyn CredentialStore>>,
    config: &ClientConfig,
    tasks: &mut Vec<JoinHandle<()>>,
) -> common::Result<Arc<dyn CredentialStore>> {
    if let Some(store) = explicit {
        return Ok(store);
    }
    match &config.credential_path {
        Some(path) => {
            let file = FileCredentialStore::open(path.clone()).await.map_err(|e| {
                common::Error::Config(format!(
                    "opening credential file {}: {e}",
                    path.display()
                ))
            })?;
            let file = Arc::new(file);
            tasks.push(file.watch(config.store_poll_interval()));
            Ok(file)
        }
        None => Ok(Arc::new(MemoryCredentialStore::standalone())),
    }
}

/// Entry point to the Flexbe API.
///
/// Background tasks owned by the client (store watcher, sync and check
/// tasks) stop when it is dropped.
pub struct FlexbeClient {
    mode: AuthMode,
    api: Arc<ApiClient>,
    meta: MetaApi,
    sites: Mutex<HashMap<u64, Arc<SiteApi>>>,
    tokens: Option<Arc<TokenManager>>,
    tasks: Vec<JoinHandle<()>>,
}

impl FlexbeClient {
    pub fn builder(config: ClientConfig) -> FlexbeClientBuilder {
        FlexbeClientBuilder {
            config,
            http: None,
            store: None,
            on_unauthorized: None,
            process_wide: false,
        }
    }

    pub async fn new(config: ClientConfig) -> common::Result<Self> {
        Self::builder(config).build().await
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// The raw request pipeline, for endpoints without a typed wrapper.
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn meta(&self) -> &MetaApi {
        &self.meta
    }

    /// APIs scoped to one site. Instances are cached per id.
    pub fn site(&self, site_id: u64) -> Arc<SiteApi> {
        let mut sites = self.sites.lock().unwrap_or_else(PoisonError::into_inner);
        sites
            .entry(site_id)
            .or_insert_with(|| Arc::new(SiteApi::new(self.api.clone(), site_id)))
            .clone()
    }

    /// Token manager, present in bearer mode only.
    pub fn tokens(&self) -> Option<&Arc<TokenManager>> {
        self.tokens.as_ref()
    }

    /// Log out. Does nothing unless the client uses bearer auth.
    pub async fn revoke_token(&self) {
        if let Some(tokens) = &self.tokens {
            tokens.revoke().await;
        }
    }
}

impl Drop for FlexbeClient {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
