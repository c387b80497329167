//! Flexbe API client
//!
//! `FlexbeClient` turns a `ClientConfig` into a request pipeline with the
//! configured auth strategy (none, static API key, or managed bearer token)
//! and exposes the resource APIs on top of it.
//!
//! Request flow:
//! 1. A resource method builds a `RequestDescriptor`
//! 2. `ApiClient::execute` resolves URL and auth headers under one deadline
//! 3. The response is decoded, or classified into an `ApiError`
//! 4. `Unauthorized` outcomes notify the registered hook

pub mod bearer;
pub mod client;
pub mod config;
pub mod meta;
pub mod metrics;
pub mod pages;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod sandbox;
pub mod site;
pub mod stat;
pub mod types;

pub use bearer::BearerProvider;
pub use client::{FlexbeClient, FlexbeClientBuilder};
pub use config::ClientConfig;
pub use meta::MetaApi;
pub use pages::PagesApi;
pub use pipeline::{ApiClient, UnauthorizedHook};
pub use provider::{ApiError, AuthMode, BulkItemError, ErrorKind};
pub use request::{QueryValue, RequestDescriptor, SITE_ID_PLACEHOLDER};
pub use response::{ApiResponse, BulkDeleteResponse, BulkOutcome, BulkUpdateResponse};
pub use sandbox::SandboxApi;
pub use site::SiteApi;
pub use stat::StatApi;
