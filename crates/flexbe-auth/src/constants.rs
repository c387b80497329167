//! Flexbe auth endpoints and credential lifetime constants
//!
//! Endpoint paths are relative to the configured API base URL. The token
//! endpoint relies on the session cookie carried by the HTTP client; there is
//! no client secret.

use std::time::Duration;

/// Token endpoint (client-credentials grant, cookie-authenticated)
pub const TOKEN_PATH: &str = "/oauth/token";

/// Revocation endpoint
pub const REVOKE_PATH: &str = "/oauth/revoke";

/// Grant type sent to the token endpoint
pub const GRANT_TYPE: &str = "client_credentials";

/// Key under which the credential is persisted. Also the default file stem.
pub const STORAGE_KEY: &str = "flexbe_jwt_token";

/// Lifetime assumed when a token's `exp` claim cannot be decoded.
///
/// Longer than the default refresh lead time, so such a token is used for a
/// short while and then refreshed instead of being trusted indefinitely.
pub const FALLBACK_LIFETIME: Duration = Duration::from_secs(4 * 60);
