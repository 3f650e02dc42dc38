use crate::client::error_body::extract_error_message;
use crate::{
    ClientError, ClientResult, CreateTenantRequest, TENANT_HEADER, TenantCurrentInfo,
    TenantRecord, UserInfo,
};

use std::fmt;
use std::time::Duration;

use log::debug;
use reqwest::{Client as ReqwestClient, Method, Url};
use serde::de::DeserializeOwned;

/// HTTP client for the tenant backend REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    tenant: Option<String>,
    client: ReqwestClient,
}

impl ApiClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Backend URL (e.g., "http://localhost:8083")
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, ReqwestClient::new())
    }

    /// Create a client whose requests time out after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = ReqwestClient::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    fn with_client(base_url: &str, client: ReqwestClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            tenant: None,
            client,
        }
    }

    /// Attach `Authorization: Bearer <token>` to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Attach `X-Tenant-ID: <tenant>` to every request
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Base URL extended with `segments`, each percent-encoded as a single
    /// path segment (`/`, `?` and `#` never escape it).
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        if let Some(segment) = segments
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(ClientError::invalid_request(format!(
                "Invalid path segment '{}'",
                segment
            )));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::invalid_request(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::invalid_request(format!(
                    "Base URL '{}' cannot be a base",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Build a request with the optional bearer token and tenant headers
    fn request(&self, method: Method, segments: &[&str]) -> ClientResult<reqwest::RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!("{} {}", method, url);
        let mut req = self.client.request(method, url);

        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        if let Some(ref tenant) = self.tenant {
            req = req.header(TENANT_HEADER, tenant);
        }

        Ok(req)
    }

    /// Execute request, returning the raw body of a successful response
    async fn execute_text(&self, req: reqwest::RequestBuilder) -> ClientResult<String> {
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .map(String::from)
                .unwrap_or_else(|| status.as_u16().to_string());
            return Err(ClientError::api_error(
                status.as_u16(),
                extract_error_message(&text, &reason),
            ));
        }

        Ok(text)
    }

    async fn execute<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> ClientResult<T> {
        let text = self.execute_text(req).await?;
        Ok(serde_json::from_str(&text)?)
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// `GET /api/me`
    pub async fn current_user(&self) -> ClientResult<UserInfo> {
        let req = self.request(Method::GET, &["api", "me"])?;
        self.execute(req).await
    }

    /// `GET /api/tenant/info`
    pub async fn tenant_info(&self) -> ClientResult<TenantCurrentInfo> {
        let req = self.request(Method::GET, &["api", "tenant", "info"])?;
        self.execute(req).await
    }

    /// `GET /api/tenant/current`; the backend answers with a JSON string or plain text
    pub async fn current_tenant(&self) -> ClientResult<String> {
        let req = self.request(Method::GET, &["api", "tenant", "current"])?;
        let text = self.execute_text(req).await?;

        Ok(serde_json::from_str::<String>(&text).unwrap_or_else(|_| text.trim().to_string()))
    }

    // =========================================================================
    // Tenant Operations
    // =========================================================================

    /// `GET /api/tenants?page&size`
    pub async fn list_tenants(&self, page: u32, size: u32) -> ClientResult<Vec<TenantRecord>> {
        let req = self
            .request(Method::GET, &["api", "tenants"])?
            .query(&[("page", page), ("size", size)]);
        self.execute(req).await
    }

    /// `GET /api/tenants/{id}`
    pub async fn tenant_by_id(&self, id: &str) -> ClientResult<TenantRecord> {
        let req = self.request(Method::GET, &["api", "tenants", id])?;
        self.execute(req).await
    }

    /// `GET /api/tenants/slug/{slug}`
    pub async fn tenant_by_slug(&self, slug: &str) -> ClientResult<TenantRecord> {
        let req = self.request(Method::GET, &["api", "tenants", "slug", slug])?;
        self.execute(req).await
    }

    /// `POST /api/tenants`
    pub async fn create_tenant(&self, request: &CreateTenantRequest) -> ClientResult<TenantRecord> {
        let req = self.request(Method::POST, &["api", "tenants"])?.json(request);
        self.execute(req).await
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("tenant", &self.tenant)
            .finish_non_exhaustive()
    }
}
