use async_trait::async_trait;
use km_client::{ApiClient, ClientResult, TenantRecord};

/// Backend lookups the tenant resolver needs
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> ClientResult<TenantRecord>;

    async fn list(&self, page: u32, size: u32) -> ClientResult<Vec<TenantRecord>>;
}

#[async_trait]
impl TenantDirectory for ApiClient {
    async fn find_by_slug(&self, slug: &str) -> ClientResult<TenantRecord> {
        self.tenant_by_slug(slug).await
    }

    async fn list(&self, page: u32, size: u32) -> ClientResult<Vec<TenantRecord>> {
        self.list_tenants(page, size).await
    }
}
