//! Classification of request failures into a closed set of kinds
//!
//! Every failure the SDK surfaces is an [`ApiError`] carrying a stable
//! [`ErrorKind`], a human-readable message, the HTTP status when one exists,
//! and, for bulk operations, the per-item errors reported by the server.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Status used for client-side aborts, mirroring HTTP 408.
pub const TIMEOUT_STATUS: u16 = 408;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 500, 502, 503, 504 (exact status kept on the error)
    Server,
    /// Deadline expired on the client side
    Timeout,
    /// Any other status, or a transport failure with no status at all
    Unclassified,
}

impl ErrorKind {
    /// Label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Server => "server_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map an HTTP status to its kind.
pub fn classify_status(status: u16) -> ErrorKind {
    match status {
        400 => ErrorKind::BadRequest,
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::NotFound,
        TIMEOUT_STATUS => ErrorKind::Timeout,
        500 | 502 | 503 | 504 => ErrorKind::Server,
        _ => ErrorKind::Unclassified,
    }
}

/// Failure of a single item inside a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemError {
    pub id: u64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

/// `message` in error bodies is either a string or a list of validation messages.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    pub fn joined(&self) -> String {
        match self {
            ErrorMessage::One(m) => m.clone(),
            ErrorMessage::Many(ms) => ms.join(", "),
        }
    }
}

/// Structured error body returned by the API on non-success statuses.
///
/// Fields are read one at a time, so an off-schema field costs only itself.
#[derive(Debug, Clone, Default)]
pub struct ErrorBody {
    pub message: Option<ErrorMessage>,
    pub error: Option<String>,
    pub status_code: Option<u16>,
    pub errors: Vec<BulkItemError>,
}

impl ErrorBody {
    /// Decode whatever is usable. Non-JSON and non-object bodies are empty.
    pub fn parse(body: &[u8]) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        let errors = map
            .get("errors")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| BulkItemError::deserialize(item).ok())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            message: field(&map, "message"),
            error: field(&map, "error"),
            status_code: field(&map, "statusCode"),
            errors,
        }
    }
}

fn field<T: DeserializeOwned>(map: &Map<String, Value>, name: &str) -> Option<T> {
    map.get(name).and_then(|v| T::deserialize(v).ok())
}

/// A classified failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    /// Machine-readable code from the body, or the kind label when absent.
    pub error: String,
    pub status_code: Option<u16>,
    /// Raw body or transport error text, for diagnostics.
    pub raw: Option<String>,
    pub item_errors: Vec<BulkItemError>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            error: kind.label().to_string(),
            status_code: None,
            raw: None,
            item_errors: Vec::new(),
        }
    }

    /// Client-side deadline expiry.
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, "Request timeout").with_status(TIMEOUT_STATUS)
    }

    /// Transport failure that produced no HTTP status (DNS, connect, TLS, ...).
    pub fn transport(err: impl fmt::Display) -> Self {
        let text = err.to_string();
        Self::new(ErrorKind::Unclassified, format!("request failed: {text}")).with_raw(text)
    }

    /// Classify a non-success response from its status and raw body.
    ///
    /// The body is decoded as an [`ErrorBody`]; when it carries no message
    /// the transport status text is used instead.
    pub fn from_response(status: u16, status_text: &str, body: &[u8]) -> Self {
        let raw = (!body.is_empty()).then(|| String::from_utf8_lossy(body).into_owned());

        let kind = classify_status(status);
        let body = ErrorBody::parse(body);
        let message = body
            .message
            .as_ref()
            .map(ErrorMessage::joined)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status_text.to_string());

        let mut err = Self::new(kind, message).with_status(status);
        if let Some(code) = body.error.filter(|c| !c.is_empty()) {
            err.error = code;
        }
        err.raw = raw;
        err.item_errors = body.errors;
        err
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn with_item_errors(mut self, items: Vec<BulkItemError>) -> Self {
        self.item_errors = items;
        self
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table() {
        assert_eq!(classify_status(400), ErrorKind::BadRequest);
        assert_eq!(classify_status(401), ErrorKind::Unauthorized);
        assert_eq!(classify_status(403), ErrorKind::Forbidden);
        assert_eq!(classify_status(404), ErrorKind::NotFound);
        assert_eq!(classify_status(408), ErrorKind::Timeout);
        for s in [500, 502, 503, 504] {
            assert_eq!(classify_status(s), ErrorKind::Server, "status {s}");
        }
        assert_eq!(classify_status(501), ErrorKind::Unclassified);
        assert_eq!(classify_status(409), ErrorKind::Unclassified);
        assert_eq!(classify_status(429), ErrorKind::Unclassified);
    }

    #[test]
    fn decodes_structured_body() {
        let body = br#"{"message":"bad creds","statusCode":401}"#;
        let err = ApiError::from_response(401, "Unauthorized", body);
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert_eq!(err.message, "bad creds");
        assert_eq!(err.error, "unauthorized");
        assert_eq!(err.status_code, Some(401));
    }

    #[test]
    fn joins_message_arrays() {
        let body = br#"{"message":["limit must be positive","offset must not be negative"],"error":"validation_failed"}"#;
        let err = ApiError::from_response(400, "Bad Request", body);
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert_eq!(
            err.message,
            "limit must be positive, offset must not be negative"
        );
        assert_eq!(err.error, "validation_failed");
    }

    #[test]
    fn falls_back_to_status_text_on_undecodable_body() {
        let err = ApiError::from_response(502, "Bad Gateway", b"<html>upstream down</html>");
        assert_eq!(err.kind, ErrorKind::Server);
        assert_eq!(err.status_code, Some(502));
        assert_eq!(err.message, "Bad Gateway");
        assert_eq!(err.raw.as_deref(), Some("<html>upstream down</html>"));
    }

    #[test]
    fn falls_back_to_status_text_on_empty_body() {
        let err = ApiError::from_response(404, "Not Found", b"");
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "Not Found");
        assert!(err.raw.is_none());
    }

    #[test]
    fn keeps_specific_server_status() {
        let err = ApiError::from_response(503, "Service Unavailable", b"{}");
        assert_eq!(err.kind, ErrorKind::Server);
        assert_eq!(err.status_code, Some(503));
    }

    #[test]
    fn unclassified_keeps_raw_status() {
        let err = ApiError::from_response(418, "I'm a teapot", br#"{"message":"short and stout"}"#);
        assert_eq!(err.kind, ErrorKind::Unclassified);
        assert_eq!(err.status_code, Some(418));
        assert_eq!(err.message, "short and stout");
    }

    #[test]
    fn carries_bulk_item_errors() {
        let body = br#"{"message":"All pages failed","errors":[{"id":7,"message":"uri taken","code":400},{"id":9,"message":"missing","error":"not_found","code":404}]}"#;
        let err = ApiError::from_response(400, "Bad Request", body);
        assert_eq!(err.item_errors.len(), 2);
        assert_eq!(err.item_errors[0].id, 7);
        assert_eq!(err.item_errors[1].error.as_deref(), Some("not_found"));
    }

    #[test]
    fn null_errors_list_keeps_message() {
        let body = br#"{"message":"limit must be positive","error":"validation_failed","errors":null}"#;
        let err = ApiError::from_response(400, "Bad Request", body);
        assert_eq!(err.message, "limit must be positive");
        assert_eq!(err.error, "validation_failed");
        assert!(err.item_errors.is_empty());
    }

    #[test]
    fn item_without_code_keeps_message() {
        let body = br#"{"message":"All pages failed","errors":[{"id":7,"message":"uri taken"}]}"#;
        let err = ApiError::from_response(400, "Bad Request", body);
        assert_eq!(err.message, "All pages failed");
        assert_eq!(err.item_errors.len(), 1);
        assert_eq!(err.item_errors[0].message, "uri taken");
        assert!(err.item_errors[0].code.is_none());
    }

    #[test]
    fn off_schema_fields_are_skipped_individually() {
        let body = br#"{"message":"nope","error":42,"statusCode":"x","errors":[{"id":"bad"},{"id":3,"message":"gone","code":404}]}"#;
        let err = ApiError::from_response(409, "Conflict", body);
        assert_eq!(err.message, "nope");
        assert_eq!(err.error, "unclassified");
        assert_eq!(err.item_errors.len(), 1);
        assert_eq!(err.item_errors[0].code, Some(404));
    }

    #[test]
    fn timeout_is_408() {
        let err = ApiError::timeout();
        assert!(err.is_timeout());
        assert_eq!(err.status_code, Some(TIMEOUT_STATUS));
        assert_eq!(err.to_string(), "timeout: Request timeout");
    }

    #[test]
    fn transport_failure_has_no_status() {
        let err = ApiError::transport("connection refused");
        assert_eq!(err.kind, ErrorKind::Unclassified);
        assert!(err.status_code.is_none());
        assert!(err.message.contains("connection refused"));
    }
}
