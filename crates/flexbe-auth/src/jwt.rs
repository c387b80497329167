//! Bearer token expiry extraction
//!
//! Reads the `exp` claim from the token's payload segment without verifying
//! the signature. The server is the authority on validity; the client only
//! needs to know when to stop presenting the token.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct Claims {
    exp: f64,
}

/// Decode the `exp` claim of a JWT and return it as unix milliseconds.
pub fn expiry_millis(token: &str) -> Result<u64> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(_), Some(payload)) if !payload.is_empty() => payload,
        _ => {
            return Err(Error::CredentialParse(
                "token has no payload segment".into(),
            ));
        }
    };

    // Tokens are base64url, but tolerate standard alphabet and padding.
    let trimmed = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .map_err(|e| Error::CredentialParse(format!("payload is not base64: {e}")))?;

    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| Error::CredentialParse(format!("payload has no numeric exp: {e}")))?;

    if !claims.exp.is_finite() || claims.exp <= 0.0 {
        return Err(Error::CredentialParse(format!(
            "exp claim out of range: {}",
            claims.exp
        )));
    }

    Ok((claims.exp * 1000.0) as u64)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an unsigned token whose payload carries the given claims.
    pub(crate) fn token_with_claims(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn reads_exp_in_millis() {
        let token = token_with_claims(&serde_json::json!({
            "sub": 42, "type": "user", "sessionId": 7, "iat": 1_700_000_000, "exp": 1_700_003_600
        }));
        assert_eq!(expiry_millis(&token).unwrap(), 1_700_003_600_000);
    }

    #[test]
    fn accepts_padded_standard_alphabet() {
        let payload = STANDARD_NO_PAD.encode(br#"{"exp":1700000000}"#);
        let token = format!("h.{payload}==.s");
        assert_eq!(expiry_millis(&token).unwrap(), 1_700_000_000_000);
    }

    #[test]
    fn rejects_opaque_tokens() {
        assert!(expiry_millis("abc.def.ghi").is_err());
        assert!(expiry_millis("no-dots-at-all").is_err());
        assert!(expiry_millis("header..sig").is_err());
    }

    #[test]
    fn rejects_missing_or_bad_exp() {
        let no_exp = token_with_claims(&serde_json::json!({"sub": 1}));
        assert!(expiry_millis(&no_exp).is_err());

        let text_exp = token_with_claims(&serde_json::json!({"exp": "tomorrow"}));
        assert!(expiry_millis(&text_exp).is_err());

        let negative = token_with_claims(&serde_json::json!({"exp": -5}));
        assert!(expiry_millis(&negative).is_err());
    }
}
