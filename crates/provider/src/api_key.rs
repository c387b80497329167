//! Static credential providers: no auth, and a fixed API key header.

use crate::{ApiError, AuthMode, ErrorKind, Provider};
use common::Secret;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::future::Future;
use std::pin::Pin;

/// Header carrying the static API key.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Sends requests without any credential.
#[derive(Debug, Default)]
pub struct NoAuthProvider;

impl Provider for NoAuthProvider {
    fn mode(&self) -> AuthMode {
        AuthMode::None
    }

    fn prepare_request<'a>(
        &'a self,
        _headers: &'a mut HeaderMap,
    ) -> Pin<Box<dyn Future<Output = crate::Result<()>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }
}

/// Attaches `x-api-key` to every request. No token management.
#[derive(Debug)]
pub struct ApiKeyProvider {
    key: Secret<String>,
}

impl ApiKeyProvider {
    pub fn new(key: Secret<String>) -> Self {
        Self { key }
    }
}

impl Provider for ApiKeyProvider {
    fn mode(&self) -> AuthMode {
        AuthMode::ApiKey
    }

    fn prepare_request<'a>(
        &'a self,
        headers: &'a mut HeaderMap,
    ) -> Pin<Box<dyn Future<Output = crate::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut value = HeaderValue::from_str(self.key.expose()).map_err(|e| {
                ApiError::new(
                    ErrorKind::Unauthorized,
                    format!("API key is not a valid header value: {e}"),
                )
            })?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn api_key_header_is_attached() {
        let provider = ApiKeyProvider::new(Secret::from("fx_key_123"));
        let mut headers = HeaderMap::new();
        provider.prepare_request(&mut headers).await.unwrap();

        assert_eq!(headers.get("x-api-key").unwrap(), "fx_key_123");
        assert!(headers.get("x-api-key").unwrap().is_sensitive());
        assert!(headers.get(reqwest::header::AUTHORIZATION).is_none());
        assert_eq!(provider.mode(), AuthMode::ApiKey);
    }

    #[tokio::test]
    async fn api_key_replaces_existing_header() {
        let provider = ApiKeyProvider::new(Secret::from("fresh"));
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("stale"));
        provider.prepare_request(&mut headers).await.unwrap();

        assert_eq!(headers.get_all("x-api-key").iter().count(), 1);
        assert_eq!(headers.get("x-api-key").unwrap(), "fresh");
    }

    #[tokio::test]
    async fn invalid_key_fails_locally() {
        let provider = ApiKeyProvider::new(Secret::from("line\nbreak"));
        let mut headers = HeaderMap::new();
        let err = provider.prepare_request(&mut headers).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert!(headers.is_empty());
    }

    #[tokio::test]
    async fn no_auth_leaves_headers_untouched() {
        let provider = NoAuthProvider;
        let mut headers = HeaderMap::new();
        provider.prepare_request(&mut headers).await.unwrap();
        assert!(headers.is_empty());
        assert_eq!(provider.mode(), AuthMode::None);
    }
}
