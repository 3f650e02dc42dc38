use crate::{AuthError, IdentityProvider, PendingLogin, Result as AuthErrorResult, TokenSet};
use crate::pkce::CHALLENGE_METHOD;

use std::time::Duration;

use async_trait::async_trait;
use km_config::IdentityConfig;
use log::debug;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use url::Url;

/// OAuth2/OIDC error body (`{"error": ..., "error_description": ...}`)
#[derive(Debug, Deserialize)]
struct OidcErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

/// Authorization-code + PKCE client for a Keycloak-style realm
pub struct OidcProvider {
    realm_url: String,
    client_id: String,
    redirect_uri: String,
    scope: String,
    client: ReqwestClient,
}

impl OidcProvider {
    #[track_caller]
    pub fn new(config: &IdentityConfig, timeout: Duration) -> AuthErrorResult<Self> {
        let client = ReqwestClient::builder().timeout(timeout).build()?;

        Ok(Self {
            realm_url: config.realm_url(),
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope.clone(),
            client,
        })
    }

    fn endpoint(&self, name: &str) -> AuthErrorResult<Url> {
        let raw = format!("{}/protocol/openid-connect/{}", self.realm_url, name);
        Url::parse(&raw)
            .map_err(|e| AuthError::configuration(format!("Invalid realm URL '{raw}': {e}")))
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> AuthErrorResult<TokenSet> {
        let url = self.endpoint("token")?;
        debug!("POST {}", url);

        let response = self.client.post(url).form(form).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<OidcErrorBody>(&text)
                .ok()
                .and_then(|body| body.error_description.or(body.error))
                .unwrap_or_else(|| format!("token endpoint returned {}", status));
            return Err(AuthError::rejected(status.as_u16(), message));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl IdentityProvider for OidcProvider {
    fn name(&self) -> &'static str {
        "oidc"
    }

    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn uses_pkce(&self) -> bool {
        true
    }

    fn login_url(&self, pending: &PendingLogin) -> AuthErrorResult<Option<Url>> {
        let challenge = pending.challenge();
        let mut url = self.endpoint("auth")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &pending.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scope)
            .append_pair("state", &pending.state)
            .append_pair("code_challenge", challenge.challenge())
            .append_pair("code_challenge_method", CHALLENGE_METHOD);

        Ok(Some(url))
    }

    fn logout_url(&self) -> Option<Url> {
        let mut url = self.endpoint("logout").ok()?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("post_logout_redirect_uri", &self.redirect_uri);
        Some(url)
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> AuthErrorResult<TokenSet> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("client_id", &self.client_id),
            ("code", code),
            ("redirect_uri", &self.redirect_uri),
            ("code_verifier", code_verifier),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> AuthErrorResult<TokenSet> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("client_id", &self.client_id),
            ("refresh_token", refresh_token),
        ])
        .await
    }
}
