//! Request pipeline
//!
//! One `execute` call:
//! 1. Arms the deadline (configured timeout, or the per-call override)
//! 2. Resolves the URL and auth headers, then applies per-call overrides
//! 3. Sends and reads the response body
//! 4. Classifies non-success statuses into an `ApiError`
//! 5. Notifies the unauthorized hook, records metrics
//!
//! The deadline covers credential resolution and transport together. When it
//! fires the in-flight transport future is dropped; a token refresh shared
//! with other callers keeps running in its own task. Nothing is retried.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use provider::{ApiError, ErrorKind, Provider};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::metrics;
use crate::request::RequestDescriptor;
use crate::response::ApiResponse;

/// Called once for every call that ends `Unauthorized`, before it returns.
pub type UnauthorizedHook = Arc<dyn Fn(&ApiError) + Send + Sync>;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    site_id: Option<String>,
    provider: Arc<dyn Provider>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, config: &ClientConfig, provider: Arc<dyn Provider>) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            site_id: config.site_id.clone(),
            provider,
            on_unauthorized: None,
        }
    }

    pub fn with_unauthorized_hook(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    /// Dispatch `request` and decode a JSON body into `T`.
    #[instrument(
        skip_all,
        fields(method = %request.method, path = %request.path, auth = %self.provider.mode())
    )]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> Result<ApiResponse<T>, ApiError> {
        let method = request.method.clone();
        let timeout = request.timeout.unwrap_or(self.timeout);
        let started = tokio::time::Instant::now();
        let deadline = started + timeout;

        let result = match tokio::time::timeout_at(deadline, self.dispatch(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "request deadline expired");
                Err(ApiError::timeout())
            }
        };

        let elapsed = started.elapsed().as_secs_f64();
        match &result {
            Ok(response) => {
                metrics::record_request(method.as_str(), Some(response.status), elapsed);
                debug!(status = response.status, "request completed");
            }
            Err(err) => {
                metrics::record_request(method.as_str(), err.status_code, elapsed);
                metrics::record_error(err.kind);
                debug!(kind = %err.kind, status = ?err.status_code, "request failed");
                if err.is_unauthorized()
                    && let Some(hook) = &self.on_unauthorized
                {
                    hook(err);
                }
            }
        }
        result
    }

    pub async fn get<T: DeserializeOwned>(&self, path: impl Into<String>) -> Result<T, ApiError> {
        self.execute(RequestDescriptor::get(path)).await?.into_data()
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> Result<ApiResponse<T>, ApiError> {
        let url = request.url(&self.base_url, self.site_id.as_deref())?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.provider.prepare_request(&mut headers).await?;
        apply_overrides(&mut headers, &request.headers);

        let mut builder = self.http.request(request.method, url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(ApiError::transport)?;
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.bytes().await.map_err(ApiError::transport)?;

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &status_text, &body));
        }

        let data = if status == StatusCode::NO_CONTENT || body.is_empty() {
            None
        } else {
            let decoded = serde_json::from_slice(&body).map_err(|e| {
                ApiError::new(
                    ErrorKind::Unclassified,
                    format!("response body could not be decoded: {e}"),
                )
                .with_status(status.as_u16())
                .with_raw(String::from_utf8_lossy(&body))
            })?;
            Some(decoded)
        };

        Ok(ApiResponse {
            data,
            status: status.as_u16(),
            status_text,
        })
    }
}

/// Apply per-call header overrides. An empty value removes the header.
fn apply_overrides(headers: &mut HeaderMap, overrides: &[(String, String)]) {
    for (name, value) in overrides {
        let name = match HeaderName::from_str(name) {
            Ok(n) => n,
            Err(e) => {
                warn!(header = %name, error = %e, "skipping invalid header name");
                continue;
            }
        };
        if value.is_empty() {
            headers.remove(&name);
            continue;
        }
        match HeaderValue::from_str(value) {
            Ok(v) => {
                headers.insert(name, v);
            }
            Err(e) => warn!(header = %name, error = %e, "skipping invalid header value"),
        }
    }
}
