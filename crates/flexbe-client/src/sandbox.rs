//! Development sandboxes of a site

use std::sync::Arc;

use provider::ApiError;
use serde_json::json;

use crate::pipeline::ApiClient;
use crate::request::RequestDescriptor;
use crate::types::Sandbox;

#[derive(Clone)]
pub struct SandboxApi {
    api: Arc<ApiClient>,
    site_id: u64,
}

impl SandboxApi {
    pub fn new(api: Arc<ApiClient>, site_id: u64) -> Self {
        Self { api, site_id }
    }

    /// Create a sandbox for `branch`, or return the existing one.
    pub async fn create(&self, branch: &str) -> Result<Sandbox, ApiError> {
        let request = RequestDescriptor::post(format!("/sites/{}/app/sandbox", self.site_id))
            .json(&json!({ "branch": branch }))?;
        self.api.execute(request).await?.into_data()
    }

    pub async fn delete(&self, sandbox_id: &str) -> Result<(), ApiError> {
        self.api
            .execute::<serde_json::Value>(RequestDescriptor::delete(format!(
                "/sites/{}/app/sandbox/{sandbox_id}",
                self.site_id
            )))
            .await?;
        Ok(())
    }
}
