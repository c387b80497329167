//! Description of one API call before it is dispatched

use std::time::Duration;

use provider::{ApiError, ErrorKind};
use reqwest::{Method, Url};
use serde::Serialize;

/// Placeholder in path templates, replaced with the configured site id.
pub const SITE_ID_PLACEHOLDER: &str = ":siteId:";

/// A query parameter value.
///
/// `Null` parameters are left out of the URL entirely. Lists are sent as one
/// comma-joined value; an empty list is treated like `Null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Null,
    Value(String),
    List(Vec<String>),
}

impl QueryValue {
    pub fn render(&self) -> Option<String> {
        match self {
            QueryValue::Null => None,
            QueryValue::Value(v) => Some(v.clone()),
            QueryValue::List(items) if items.is_empty() => None,
            QueryValue::List(items) => Some(items.join(",")),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Value(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Value(value)
    }
}

macro_rules! query_value_from_display {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(value: $t) -> Self {
                QueryValue::Value(value.to_string())
            }
        })*
    };
}

query_value_from_display!(u32, u64, i32, i64, bool);

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Null, Into::into)
    }
}

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(items: Vec<T>) -> Self {
        QueryValue::List(items.iter().map(ToString::to_string).collect())
    }
}

/// Method, path template, query, body, header overrides and an optional
/// timeout for one call. Build with the method constructors:
///
/// ```ignore
/// RequestDescriptor::get("/sites/:siteId:/pages")
///     .query("limit", 20u32)
///     .query("status", vec!["published", "drafted"])
/// ```
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, QueryValue)>,
    pub body: Option<serde_json::Value>,
    /// Applied after the auth headers. An empty value removes the header.
    pub headers: Vec<(String, String)>,
    /// Overrides the configured request timeout.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| {
            ApiError::new(
                ErrorKind::Unclassified,
                format!("request body could not be serialized: {e}"),
            )
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Send without `name`, even if the auth strategy would set it.
    pub fn without_header(self, name: impl Into<String>) -> Self {
        self.header(name, "")
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the full URL against `base_url`.
    pub fn url(&self, base_url: &str, site_id: Option<&str>) -> Result<Url, ApiError> {
        let path = match site_id {
            Some(id) => self.path.replace(SITE_ID_PLACEHOLDER, id),
            None => self.path.clone(),
        };
        let raw = format!("{}{path}", base_url.trim_end_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| {
            ApiError::new(ErrorKind::Unclassified, format!("invalid request URL {raw}: {e}"))
        })?;

        let pairs: Vec<(&str, String)> = self
            .query
            .iter()
            .filter_map(|(key, value)| value.render().map(|v| (key.as_str(), v)))
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}
