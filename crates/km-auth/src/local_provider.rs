use crate::{AuthError, IdentityProvider, PendingLogin, Result as AuthErrorResult, TokenSet};

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as ReqwestClient, Method};
use serde::{Deserialize, Serialize};
use url::Url;

const TENANT_HEADER: &str = "X-Tenant-ID";

#[derive(Debug, Deserialize)]
struct LocalErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Credential login against the backend's own `/api/auth` endpoints.
///
/// There is no authorization-code flow; `login_url` points at a
/// login page when one is configured.
pub struct LocalAuthProvider {
    api_base_url: String,
    client_id: String,
    login_page: Option<Url>,
    client: ReqwestClient,
}

impl LocalAuthProvider {
    #[track_caller]
    pub fn new(
        api_base_url: &str,
        client_id: &str,
        login_page: Option<&str>,
        timeout: Duration,
    ) -> AuthErrorResult<Self> {
        let login_page = login_page
            .map(|page| {
                Url::parse(page).map_err(|e| {
                    AuthError::configuration(format!("Invalid login page URL '{page}': {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            login_page,
            client: ReqwestClient::builder().timeout(timeout).build()?,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.api_base_url, path);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn execute(
        &self,
        req: reqwest::RequestBuilder,
        fallback: &str,
    ) -> AuthErrorResult<TokenSet> {
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<LocalErrorBody>(&text)
                .ok()
                .and_then(|body| body.error.or(body.message))
                .unwrap_or_else(|| fallback.to_string());
            return Err(AuthError::rejected(status.as_u16(), message));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl IdentityProvider for LocalAuthProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn uses_pkce(&self) -> bool {
        false
    }

    fn login_url(&self, _pending: &PendingLogin) -> AuthErrorResult<Option<Url>> {
        Ok(self.login_page.clone())
    }

    fn logout_url(&self) -> Option<Url> {
        None
    }

    async fn exchange_code(&self, _code: &str, _code_verifier: &str) -> AuthErrorResult<TokenSet> {
        Err(AuthError::unsupported("Authorization code exchange", self.name()))
    }

    async fn refresh(&self, refresh_token: &str) -> AuthErrorResult<TokenSet> {
        #[derive(Serialize)]
        struct RefreshRequest<'a> {
            refresh_token: &'a str,
        }

        let req = self
            .request(Method::POST, "/api/auth/refresh")
            .json(&RefreshRequest { refresh_token });
        self.execute(req, "Token refresh failed").await
    }

    async fn password_login(
        &self,
        email: &str,
        password: &str,
        tenant: Option<&str>,
    ) -> AuthErrorResult<TokenSet> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct LoginRequest<'a> {
            email: &'a str,
            password: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            tenant_id: Option<&'a str>,
        }

        let mut req = self
            .request(Method::POST, "/api/auth/login")
            .json(&LoginRequest {
                email,
                password,
                tenant_id: tenant,
            });
        if let Some(tenant) = tenant {
            req = req.header(TENANT_HEADER, tenant);
        }

        self.execute(req, "Login failed").await
    }
}
