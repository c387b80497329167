//! Token endpoint interactions
//!
//! Two calls against the API base URL:
//! 1. `POST /oauth/token` issues a bearer token for the session carried by
//!    the HTTP client's cookie jar (client-credentials grant)
//! 2. `POST /oauth/revoke` invalidates a token server-side
//!
//! Failures come back as classified [`ApiError`]s so callers branch on kind.

use std::time::Duration;

use provider::ApiError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{GRANT_TYPE, REVOKE_PATH, TOKEN_PATH};

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
}

#[derive(Debug, Serialize)]
struct RevokeRequest<'a> {
    token: &'a str,
}

/// Response from the token endpoint.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn send_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::timeout()
    } else {
        ApiError::transport(e)
    }
}

async fn error_from(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    ApiError::from_response(
        status.as_u16(),
        status.canonical_reason().unwrap_or_default(),
        &body,
    )
}

/// Request a new access token.
///
/// 401 means the session behind the cookie jar is gone and maps to
/// `Unauthorized`; other statuses go through the usual classification.
pub async fn fetch_token(
    client: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
) -> Result<TokenResponse, ApiError> {
    let url = endpoint(base_url, TOKEN_PATH);
    debug!(%url, "requesting access token");

    let response = client
        .post(&url)
        .json(&TokenRequest {
            grant_type: GRANT_TYPE,
        })
        .timeout(timeout)
        .send()
        .await
        .map_err(send_error)?;

    if !response.status().is_success() {
        return Err(error_from(response).await);
    }

    let status = response.status().as_u16();
    let token = response.json::<TokenResponse>().await.map_err(|e| {
        if e.is_timeout() {
            ApiError::timeout()
        } else {
            ApiError::transport(format!("invalid token response: {e}")).with_status(status)
        }
    })?;

    if token.access_token.is_empty() {
        return Err(
            ApiError::transport("token endpoint returned an empty accessToken").with_status(status),
        );
    }

    debug!(token_len = token.access_token.len(), "access token issued");
    Ok(token)
}

/// Revoke `access_token` server-side. The token itself authorizes the call.
pub async fn revoke_token(
    client: &reqwest::Client,
    base_url: &str,
    access_token: &str,
    timeout: Duration,
) -> Result<(), ApiError> {
    let url = endpoint(base_url, REVOKE_PATH);
    debug!(%url, "revoking access token");

    let response = client
        .post(&url)
        .bearer_auth(access_token)
        .json(&RevokeRequest {
            token: access_token,
        })
        .timeout(timeout)
        .send()
        .await
        .map_err(send_error)?;

    if !response.status().is_success() {
        return Err(error_from(response).await);
    }
    Ok(())
}
