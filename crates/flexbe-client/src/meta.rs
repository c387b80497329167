//! Public dictionaries. Sent without an `Authorization` header.

use std::sync::Arc;

use provider::ApiError;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;

use crate::pipeline::ApiClient;
use crate::request::RequestDescriptor;
use crate::types::{SiteCurrency, SiteLanguage, UserLanguage};

#[derive(Clone)]
pub struct MetaApi {
    api: Arc<ApiClient>,
}

impl MetaApi {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = RequestDescriptor::get(path).without_header(AUTHORIZATION.as_str());
        self.api.execute(request).await?.into_data()
    }

    pub async fn site_languages(&self) -> Result<Vec<SiteLanguage>, ApiError> {
        self.fetch("/meta/site-languages").await
    }

    /// Languages available for the editor interface.
    pub async fn user_languages(&self) -> Result<Vec<UserLanguage>, ApiError> {
        self.fetch("/meta/user-languages").await
    }

    pub async fn site_currencies(&self) -> Result<Vec<SiteCurrency>, ApiError> {
        self.fetch("/meta/site-currencies").await
    }
}
