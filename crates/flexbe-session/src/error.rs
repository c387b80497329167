//! Error types for credential lifecycle operations

use provider::{ApiError, ErrorKind};

/// Errors from refreshing a credential.
///
/// `Clone` because one refresh outcome is delivered to every waiting caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("credential revoked while refresh was in flight")]
    Revoked,

    #[error("refresh task failed: {0}")]
    Task(String),
}

/// Result alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Api(e) => e,
            Error::Revoked => ApiError::new(ErrorKind::Unauthorized, err.to_string()),
            Error::Task(_) => ApiError::new(ErrorKind::Unclassified, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_pass_through_unchanged() {
        let original = ApiError::from_response(401, "Unauthorized", b"");
        let back: ApiError = Error::Api(original.clone()).into();
        assert_eq!(back, original);
    }

    #[test]
    fn superseded_refresh_surfaces_as_unauthorized() {
        let err: ApiError = Error::Revoked.into();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert!(err.status_code.is_none());
    }
}
