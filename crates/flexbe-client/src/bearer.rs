//! Bearer strategy: token manager backed `Authorization` header

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use flexbe_session::TokenManager;
use provider::{ApiError, AuthMode, ErrorKind, Provider};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

/// Resolves a credential through the token manager and attaches it.
///
/// Fails before any request is sent when no credential can be obtained.
pub struct BearerProvider {
    manager: Arc<TokenManager>,
}

impl BearerProvider {
    pub fn new(manager: Arc<TokenManager>) -> Self {
        Self { manager }
    }
}

impl Provider for BearerProvider {
    fn mode(&self) -> AuthMode {
        AuthMode::Bearer
    }

    fn prepare_request<'a>(
        &'a self,
        headers: &'a mut HeaderMap,
    ) -> Pin<Box<dyn Future<Output = provider::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let credential = self
                .manager
                .get_credential()
                .await
                .map_err(ApiError::from)?
                .ok_or_else(|| {
                    ApiError::new(ErrorKind::Unauthorized, "No valid bearer token available")
                })?;

            let mut value = HeaderValue::from_str(&format!("Bearer {}", credential.access_token))
                .map_err(|e| {
                    ApiError::new(
                        ErrorKind::Unauthorized,
                        format!("access token is not a valid header value: {e}"),
                    )
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
            debug!(
                expires_in_secs = credential.remaining().as_secs(),
                "attached bearer token"
            );
            Ok(())
        })
    }
}
