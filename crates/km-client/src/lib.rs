//! km-client library
//!
//! HTTP client for the tenant backend REST API, plus the bounded retry
//! helper used for tenant creation.

pub(crate) mod client;
pub mod models;
pub mod retry;
pub mod slug;


pub use client::{ApiClient, ClientError, Result as ClientResult, extract_error_message};
pub use models::{
    AdminUser, CreateTenantRequest, NewTenant, TenantCurrentInfo, TenantRecord, UserInfo,
};
pub use retry::{RetryOutcome, retry_bounded};
pub use slug::normalize_slug;

pub const TENANT_HEADER: &str = "X-Tenant-ID";
