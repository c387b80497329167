//! Secret wrapper for API keys and other values that must never reach logs

use serde::{Deserialize, Deserializer};
use std::fmt;
use zeroize::Zeroize;

/// Sensitive value - redacted in Debug/Display/logs, wiped on drop
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the inner value (header construction only)
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl Secret<String> {
    /// True when the wrapped string is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for Secret<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret<String> {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl<'de> Deserialize<'de> for Secret<String> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Secret)
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_are_redacted() {
        let key = Secret::from("fx_live_key");
        assert_eq!(format!("{key:?}"), "[REDACTED]");
        assert_eq!(key.to_string(), "[REDACTED]");
    }

    #[test]
    fn expose_returns_inner_value() {
        let key = Secret::new(String::from("fx_live_key"));
        assert_eq!(key.expose(), "fx_live_key");
    }

    #[test]
    fn deserializes_from_plain_string() {
        #[derive(Deserialize)]
        struct Holder {
            key: Secret<String>,
        }
        let holder: Holder = serde_json::from_str(r#"{"key":"abc"}"#).unwrap();
        assert_eq!(holder.key.expose(), "abc");
    }

    #[test]
    fn blank_detection() {
        assert!(Secret::from("   ").is_blank());
        assert!(!Secret::from("k").is_blank());
    }
}
