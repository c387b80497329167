//! Pages, folders, content, history and versions of one site

use std::sync::Arc;

use provider::ApiError;
use serde_json::json;

use crate::pipeline::ApiClient;
use crate::request::{QueryValue, RequestDescriptor};
use crate::response::{BulkDeleteResponse, BulkOutcome, BulkUpdateResponse};
use crate::types::{
    BulkFolderUpdate, BulkPageUpdate, CreateVersionParams, FolderParams, Page, PageContent,
    PageFolder, PageFolderListResponse, PageHistoryItem, PageHistoryList, PageListResponse,
    PageQuery, PageVersion, PageVersionList, UpdatePageParams, VersionRef,
};

#[derive(Clone)]
pub struct PagesApi {
    api: Arc<ApiClient>,
    site_id: u64,
}

impl PagesApi {
    pub fn new(api: Arc<ApiClient>, site_id: u64) -> Self {
        Self { api, site_id }
    }

    fn path(&self, rest: &str) -> String {
        format!("/sites/{}/{rest}", self.site_id)
    }

    /// List pages. Type and status filters are sent comma-joined.
    pub async fn list(&self, query: &PageQuery) -> Result<PageListResponse, ApiError> {
        let request = RequestDescriptor::get(self.path("pages"))
            .query("offset", query.offset)
            .query("limit", query.limit)
            .query("type", joined(&query.types))
            .query("status", joined(&query.statuses))
            .query("uri", query.uri.clone())
            .query("search", query.search.clone())
            .query("folderId", query.folder_id)
            .query("themeId", query.theme_id);
        self.api.execute(request).await?.into_data()
    }

    pub async fn get(&self, page_id: u64) -> Result<Page, ApiError> {
        self.api.get(self.path(&format!("pages/{page_id}"))).await
    }

    pub async fn update(&self, page_id: u64, params: &UpdatePageParams) -> Result<Page, ApiError> {
        let request =
            RequestDescriptor::put(self.path(&format!("pages/{page_id}"))).json(params)?;
        self.api.execute(request).await?.into_data()
    }

    pub async fn delete(&self, page_id: u64) -> Result<(), ApiError> {
        self.api
            .execute::<serde_json::Value>(RequestDescriptor::delete(
                self.path(&format!("pages/{page_id}")),
            ))
            .await?;
        Ok(())
    }

    /// Update several pages at once. Fails only if every item failed.
    pub async fn bulk_update(
        &self,
        updates: &[BulkPageUpdate],
    ) -> Result<BulkUpdateResponse<Page>, ApiError> {
        let request = RequestDescriptor::patch(self.path("pages")).json(&updates)?;
        self.api
            .execute::<BulkUpdateResponse<Page>>(request)
            .await?
            .into_data()?
            .into_result()
    }

    /// Delete several pages at once. Fails only if every item failed.
    pub async fn bulk_delete(&self, ids: &[u64]) -> Result<BulkDeleteResponse, ApiError> {
        let request = RequestDescriptor::delete(self.path("pages")).json(&json!({ "ids": ids }))?;
        self.api
            .execute::<BulkDeleteResponse>(request)
            .await?
            .into_data()?
            .into_result()
    }

    pub async fn folders(&self) -> Result<PageFolderListResponse, ApiError> {
        self.api.get(self.path("pages-folders")).await
    }

    pub async fn folder(&self, folder_id: u64) -> Result<PageFolder, ApiError> {
        self.api
            .get(self.path(&format!("pages-folders/{folder_id}")))
            .await
    }

    pub async fn create_folder(&self, params: &FolderParams) -> Result<PageFolder, ApiError> {
        let request = RequestDescriptor::post(self.path("pages-folders")).json(params)?;
        self.api.execute(request).await?.into_data()
    }

    pub async fn update_folder(
        &self,
        folder_id: u64,
        params: &FolderParams,
    ) -> Result<PageFolder, ApiError> {
        let request =
            RequestDescriptor::patch(self.path(&format!("pages-folders/{folder_id}")))
                .json(params)?;
        self.api.execute(request).await?.into_data()
    }

    /// Delete a folder and its items.
    pub async fn delete_folder(&self, folder_id: u64) -> Result<(), ApiError> {
        self.api
            .execute::<serde_json::Value>(RequestDescriptor::delete(
                self.path(&format!("pages-folders/{folder_id}")),
            ))
            .await?;
        Ok(())
    }

    pub async fn bulk_update_folders(
        &self,
        updates: &[BulkFolderUpdate],
    ) -> Result<BulkUpdateResponse<PageFolder>, ApiError> {
        let request = RequestDescriptor::patch(self.path("pages-folders")).json(&updates)?;
        self.api
            .execute::<BulkUpdateResponse<PageFolder>>(request)
            .await?
            .into_data()?
            .into_result()
    }

    pub async fn content(&self, page_id: u64) -> Result<PageContent, ApiError> {
        self.api
            .get(self.path(&format!("pages/{page_id}/content")))
            .await
    }

    pub async fn update_content(
        &self,
        page_id: u64,
        content: &PageContent,
    ) -> Result<PageContent, ApiError> {
        let request =
            RequestDescriptor::put(self.path(&format!("pages/{page_id}/content"))).json(content)?;
        self.api.execute(request).await?.into_data()
    }

    pub async fn history(&self, page_id: u64) -> Result<PageHistoryList, ApiError> {
        self.api
            .get(self.path(&format!("pages/{page_id}/history")))
            .await
    }

    pub async fn history_item(
        &self,
        page_id: u64,
        version_id: u64,
    ) -> Result<PageHistoryItem, ApiError> {
        self.api
            .get(self.path(&format!("pages/{page_id}/history/{version_id}")))
            .await
    }

    pub async fn versions(&self, page_id: u64) -> Result<PageVersionList, ApiError> {
        self.api
            .get(self.path(&format!("pages/{page_id}/versions")))
            .await
    }

    pub async fn version(
        &self,
        page_id: u64,
        version: VersionRef,
    ) -> Result<PageVersion, ApiError> {
        self.api
            .get(self.path(&format!("pages/{page_id}/versions/{version}")))
            .await
    }

    pub async fn published_version(&self, page_id: u64) -> Result<PageVersion, ApiError> {
        self.version(page_id, VersionRef::Published).await
    }

    pub async fn create_version(
        &self,
        page_id: u64,
        params: &CreateVersionParams,
    ) -> Result<PageVersion, ApiError> {
        let request =
            RequestDescriptor::post(self.path(&format!("pages/{page_id}/versions"))).json(params)?;
        self.api.execute(request).await?.into_data()
    }
}

fn joined<T: ToString>(items: &[T]) -> QueryValue {
    QueryValue::List(items.iter().map(ToString::to_string).collect())
}
