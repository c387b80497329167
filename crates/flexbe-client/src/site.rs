//! Per-site API bundle

use std::sync::Arc;

use crate::pages::PagesApi;
use crate::pipeline::ApiClient;
use crate::sandbox::SandboxApi;
use crate::stat::StatApi;

pub struct SiteApi {
    site_id: u64,
    pages: PagesApi,
    sandbox: SandboxApi,
    stat: StatApi,
}

impl SiteApi {
    pub fn new(api: Arc<ApiClient>, site_id: u64) -> Self {
        Self {
            site_id,
            pages: PagesApi::new(api.clone(), site_id),
            sandbox: SandboxApi::new(api.clone(), site_id),
            stat: StatApi::new(api, site_id),
        }
    }

    pub fn site_id(&self) -> u64 {
        self.site_id
    }

    pub fn pages(&self) -> &PagesApi {
        &self.pages
    }

    pub fn sandbox(&self) -> &SandboxApi {
        &self.sandbox
    }

    pub fn stat(&self) -> &StatApi {
        &self.stat
    }
}
