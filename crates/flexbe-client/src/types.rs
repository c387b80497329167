//! Wire types for the resource endpoints
//!
//! Only the envelope fields are typed. Page content, history and version
//! payloads are free-form documents and stay `serde_json::Value`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Page,
    File,
    Global,
    Ai,
    Cms,
    EcommerceProduct,
    EcommerceCategory,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Page => "page",
            PageType::File => "file",
            PageType::Global => "global",
            PageType::Ai => "ai",
            PageType::Cms => "cms",
            PageType::EcommerceProduct => "ecommerce_product",
            PageType::EcommerceCategory => "ecommerce_category",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Published,
    Drafted,
    Deleted,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Published => "published",
            PageStatus::Drafted => "drafted",
            PageStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: u64,
    pub site_id: u64,
    #[serde(rename = "type")]
    pub page_type: PageType,
    pub uri: String,
    #[serde(default)]
    pub title: Option<String>,
    pub status: PageStatus,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub img_id: Option<u64>,
    #[serde(default)]
    pub sort_index: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageListResponse {
    pub pages: Vec<Page>,
    pub pagination: Pagination,
}

/// Filters for listing pages. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub types: Vec<PageType>,
    pub statuses: Vec<PageStatus>,
    /// Exact match with a leading `/`, partial match with `%word%`.
    pub uri: Option<String>,
    pub search: Option<String>,
    pub folder_id: Option<u64>,
    pub theme_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFolder {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub sort_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFolderListResponse {
    pub folders: Vec<PageFolder>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_index: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFolderUpdate {
    pub folder_id: u64,
    #[serde(flatten)]
    pub changes: FolderParams,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noindex: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PageStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPageUpdate {
    pub page_id: u64,
    #[serde(flatten)]
    pub changes: UpdatePageParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionParams {
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<serde_json::Value>,
    /// Server default is to publish immediately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
}

/// A stored version, or whichever version is currently published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRef {
    Id(u64),
    Published,
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRef::Id(id) => write!(f, "{id}"),
            VersionRef::Published => f.write_str("published"),
        }
    }
}

pub type PageContent = serde_json::Value;
pub type PageHistoryList = serde_json::Value;
pub type PageHistoryItem = serde_json::Value;
pub type PageVersionList = serde_json::Value;
pub type PageVersion = serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sandbox {
    pub id: String,
    pub preview_url: String,
    pub controller_url: String,
    pub ide_url: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTest {
    pub id: u64,
    pub page_id: u64,
    pub created_at: String,
    pub a_count_view: u64,
    pub a_count_lead: u64,
    pub b_count_view: u64,
    pub b_count_lead: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteLanguage {
    pub code: String,
    pub name_en: String,
    pub name_native: String,
}

pub type UserLanguage = SiteLanguage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteCurrency {
    pub code: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub symbol_variants: Vec<String>,
    pub decimals: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_decodes_from_camel_case() {
        let page: Page = serde_json::from_value(json!({
            "id": 5,
            "siteId": 12,
            "type": "ecommerce_product",
            "uri": "/shop/",
            "title": null,
            "status": "drafted",
            "imgId": null,
            "sortIndex": 2
        }))
        .unwrap();
        assert_eq!(page.page_type, PageType::EcommerceProduct);
        assert_eq!(page.status, PageStatus::Drafted);
        assert!(page.title.is_none());
    }

    #[test]
    fn bulk_update_flattens_changes() {
        let item = BulkPageUpdate {
            page_id: 3,
            changes: UpdatePageParams {
                status: Some(PageStatus::Published),
                ..UpdatePageParams::default()
            },
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"pageId": 3, "status": "published"})
        );
    }

    #[test]
    fn enum_labels_match_wire_names() {
        for t in [PageType::Page, PageType::Ai, PageType::EcommerceCategory] {
            assert_eq!(serde_json::to_value(t).unwrap(), json!(t.as_str()));
        }
        assert_eq!(PageStatus::Deleted.to_string(), "deleted");
        assert_eq!(VersionRef::Published.to_string(), "published");
        assert_eq!(VersionRef::Id(44).to_string(), "44");
    }
}
