//! Authentication strategies and the failure taxonomy for API requests
//!
//! Defines the `Provider` trait that decouples the request pipeline from how
//! credentials are attached. `NoAuthProvider` and `ApiKeyProvider` cover the
//! static modes; the bearer strategy lives next to the token manager in
//! `flexbe-client` and implements the same trait.

pub mod api_key;
pub mod taxonomy;

pub use api_key::{API_KEY_HEADER, ApiKeyProvider, NoAuthProvider};
pub use taxonomy::{
    ApiError, BulkItemError, ErrorBody, ErrorKind, ErrorMessage, TIMEOUT_STATUS, classify_status,
};

use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// How a client instance authenticates. Fixed for the lifetime of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AuthMode {
    #[serde(rename = "none")]
    None,
    #[default]
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "bearer")]
    Bearer,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::None => f.write_str("none"),
            AuthMode::ApiKey => f.write_str("apiKey"),
            AuthMode::Bearer => f.write_str("bearer"),
        }
    }
}

/// Result alias for request-facing operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Attaches credentials to outgoing requests.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility (`Arc<dyn Provider>`).
pub trait Provider: Send + Sync {
    /// Mode this provider implements, for logging and hook decisions.
    fn mode(&self) -> AuthMode;

    /// Insert authentication headers.
    ///
    /// An error here means no credential could be obtained; the pipeline
    /// returns it without sending the request.
    fn prepare_request<'a>(
        &'a self,
        headers: &'a mut HeaderMap,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        mode: AuthMode,
    }

    #[test]
    fn auth_mode_uses_wire_names() {
        let h: Holder = serde_json::from_str(r#"{"mode":"bearer"}"#).unwrap();
        assert_eq!(h.mode, AuthMode::Bearer);
        let h: Holder = serde_json::from_str(r#"{"mode":"apiKey"}"#).unwrap();
        assert_eq!(h.mode, AuthMode::ApiKey);
        let h: Holder = serde_json::from_str(r#"{"mode":"none"}"#).unwrap();
        assert_eq!(h.mode, AuthMode::None);
        assert!(serde_json::from_str::<Holder>(r#"{"mode":"basic"}"#).is_err());
    }

    #[test]
    fn auth_mode_defaults_to_api_key() {
        assert_eq!(AuthMode::default(), AuthMode::ApiKey);
        assert_eq!(AuthMode::Bearer.to_string(), "bearer");
    }
}
