//! A/B test statistics of a site

use std::sync::Arc;

use provider::ApiError;
use serde_json::json;

use crate::pipeline::ApiClient;
use crate::request::RequestDescriptor;
use crate::types::AbTest;

#[derive(Clone)]
pub struct StatApi {
    api: Arc<ApiClient>,
    site_id: u64,
}

impl StatApi {
    pub fn new(api: Arc<ApiClient>, site_id: u64) -> Self {
        Self { api, site_id }
    }

    pub async fn ab_test(&self, test_id: u64) -> Result<AbTest, ApiError> {
        self.api
            .get(format!("/sites/{}/stat-abtests/{test_id}", self.site_id))
            .await
    }

    /// Start an A/B test on `page_id`.
    pub async fn create_ab_test(&self, page_id: u64) -> Result<AbTest, ApiError> {
        let request = RequestDescriptor::post(format!("/sites/{}/stat-abtests", self.site_id))
            .json(&json!({ "pageId": page_id }))?;
        self.api.execute(request).await?.into_data()
    }
}
