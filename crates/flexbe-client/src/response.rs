//! Successful response envelopes

use provider::{ApiError, BulkItemError, ErrorKind};
use serde::{Deserialize, Serialize};

/// Decoded body plus transport status.
///
/// `data` is `None` for 204 No Content and for empty bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub status: u16,
    pub status_text: String,
}

impl<T> ApiResponse<T> {
    /// The body, or an error if the server sent none.
    pub fn into_data(self) -> Result<T, ApiError> {
        let status = self.status;
        self.data.ok_or_else(|| {
            ApiError::new(ErrorKind::Unclassified, "response had no body").with_status(status)
        })
    }
}

/// Result of a bulk update: what succeeded and which items failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkUpdateResponse<T> {
    #[serde(default = "Vec::new")]
    pub updated: Vec<T>,
    #[serde(default)]
    pub errors: Vec<BulkItemError>,
}

/// Result of a bulk delete: ids removed and which items failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    #[serde(default)]
    pub deleted: Vec<u64>,
    #[serde(default)]
    pub errors: Vec<BulkItemError>,
}

/// Shared shape of bulk envelopes.
pub trait BulkOutcome {
    fn succeeded(&self) -> usize;
    fn item_errors(&self) -> &[BulkItemError];

    /// Partial success passes through; a batch where every item failed
    /// becomes a `BadRequest` carrying the item errors.
    fn into_result(self) -> Result<Self, ApiError>
    where
        Self: Sized,
    {
        if self.succeeded() > 0 || self.item_errors().is_empty() {
            return Ok(self);
        }
        let message = self
            .item_errors()
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(ApiError::new(ErrorKind::BadRequest, message)
            .with_status(400)
            .with_item_errors(self.item_errors().to_vec()))
    }
}

impl<T> BulkOutcome for BulkUpdateResponse<T> {
    fn succeeded(&self) -> usize {
        self.updated.len()
    }

    fn item_errors(&self) -> &[BulkItemError] {
        &self.errors
    }
}

impl BulkOutcome for BulkDeleteResponse {
    fn succeeded(&self) -> usize {
        self.deleted.len()
    }

    fn item_errors(&self) -> &[BulkItemError] {
        &self.errors
    }
}
