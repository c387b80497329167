//! Client configuration and loading
//!
//! Precedence: environment > config file > defaults. The API key is read from
//! `FLEXBE_API_KEY` or from `api_key_file`, never from the TOML itself.

use common::Secret;
use provider::AuthMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.flexbe.com";

/// Environment variable overriding `base_url`.
pub const ENV_API_URL: &str = "FLEXBE_API_URL";
/// Environment variable supplying the API key.
pub const ENV_API_KEY: &str = "FLEXBE_API_KEY";
/// Environment variable naming the config file.
pub const ENV_CONFIG: &str = "FLEXBE_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Budget for one request, covering credential resolution and transport.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub auth_mode: AuthMode,
    #[serde(skip)]
    pub api_key: Option<Secret<String>>,
    /// File holding the API key (alternative to FLEXBE_API_KEY)
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,
    /// Replaces `:siteId:` in request paths.
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default = "default_refresh_lead_secs")]
    pub refresh_lead_secs: u64,
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    /// Shared credential file for bearer mode. Without it the credential
    /// lives in memory for this process only.
    #[serde(default)]
    pub credential_path: Option<PathBuf>,
    /// How often the credential file is polled for other processes' changes.
    #[serde(default = "default_store_poll_ms")]
    pub store_poll_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_refresh_lead_secs() -> u64 {
    60
}

fn default_check_interval_secs() -> u64 {
    60
}

fn default_store_poll_ms() -> u64 {
    1_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            auth_mode: AuthMode::default(),
            api_key: None,
            api_key_file: None,
            site_id: None,
            refresh_lead_secs: default_refresh_lead_secs(),
            check_interval_secs: default_check_interval_secs(),
            credential_path: None,
            store_poll_ms: default_store_poll_ms(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file, overlay the environment, validate.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: ClientConfig = toml::from_str(&contents)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment, for callers without a config file.
    pub fn from_env() -> common::Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay `FLEXBE_API_URL` and resolve the API key.
    ///
    /// Key resolution order:
    /// 1. FLEXBE_API_KEY env var
    /// 2. api_key_file path from config
    pub fn apply_env(&mut self) -> common::Result<()> {
        if let Ok(url) = std::env::var(ENV_API_URL)
            && !url.trim().is_empty()
        {
            self.base_url = url.trim().to_string();
        }

        if let Ok(key) = std::env::var(ENV_API_KEY) {
            let key = Secret::new(key);
            if !key.is_blank() {
                self.api_key = Some(key);
                return Ok(());
            }
        }
        if let Some(ref key_file) = self.api_key_file {
            let key = std::fs::read_to_string(key_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read api_key_file {}: {e}",
                    key_file.display()
                ))
            })?;
            let key = key.trim().to_owned();
            if !key.is_empty() {
                self.api_key = Some(Secret::new(key));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> common::Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_ms == 0 {
            return Err(common::Error::Config(
                "timeout_ms must be greater than 0".into(),
            ));
        }

        if self.check_interval_secs == 0 {
            return Err(common::Error::Config(
                "check_interval_secs must be greater than 0".into(),
            ));
        }

        if self.store_poll_ms == 0 {
            return Err(common::Error::Config(
                "store_poll_ms must be greater than 0".into(),
            ));
        }

        if self.auth_mode == AuthMode::ApiKey
            && self.api_key.as_ref().is_none_or(|k| k.is_blank())
        {
            return Err(common::Error::Config(format!(
                "API key is required for apiKey authentication; set {ENV_API_KEY} or api_key_file"
            )));
        }

        Ok(())
    }

    /// Resolve config file path from CLI arg or FLEXBE_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var(ENV_CONFIG) {
            return PathBuf::from(p);
        }
        PathBuf::from("flexbe.toml")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn refresh_lead(&self) -> Duration {
        Duration::from_secs(self.refresh_lead_secs)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn store_poll_interval(&self) -> Duration {
        Duration::from_millis(self.store_poll_ms)
    }
}
