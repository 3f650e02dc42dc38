use crate::{
    AuthMode, ConfigError, ConfigErrorResult, DEFAULT_IDP_BASE_URL, DEFAULT_IDP_CLIENT_ID,
    DEFAULT_IDP_REALM, DEFAULT_IDP_REDIRECT_URI, DEFAULT_IDP_SCOPE,
};

use std::path::Path;

use serde::Deserialize;

/// Identity provider (realm/client) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub mode: AuthMode,
    /// Identity provider base URL, without the `/realms/...` suffix
    pub base_url: String,
    pub realm: String,
    pub client_id: String,
    /// Where the identity provider sends the browser back with `?code=`
    pub redirect_uri: String,
    pub scope: String,
    /// Local mode only: page to send the user to for password login
    pub login_page: Option<String>,
    /// Optional HS256 secret for verifying token signatures
    pub jwt_secret: Option<String>,
    /// Optional RS256 public key (PEM) for verifying token signatures
    pub jwt_public_key_path: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            base_url: String::from(DEFAULT_IDP_BASE_URL),
            realm: String::from(DEFAULT_IDP_REALM),
            client_id: String::from(DEFAULT_IDP_CLIENT_ID),
            redirect_uri: String::from(DEFAULT_IDP_REDIRECT_URI),
            scope: String::from(DEFAULT_IDP_SCOPE),
            login_page: None,
            jwt_secret: None,
            jwt_public_key_path: None,
        }
    }
}

impl IdentityConfig {
    pub fn validate(&self, config_dir: &Path) -> ConfigErrorResult<()> {
        if !is_http_url(&self.base_url) {
            return Err(ConfigError::identity(format!(
                "identity.base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        if !is_http_url(&self.redirect_uri) {
            return Err(ConfigError::identity(format!(
                "identity.redirect_uri must be an http(s) URL, got '{}'",
                self.redirect_uri
            )));
        }

        if self.realm.trim().is_empty() {
            return Err(ConfigError::identity("identity.realm cannot be empty"));
        }

        if self.client_id.trim().is_empty() {
            return Err(ConfigError::identity("identity.client_id cannot be empty"));
        }

        if self.jwt_secret.is_some() && self.jwt_public_key_path.is_some() {
            return Err(ConfigError::identity(
                "identity.jwt_secret and identity.jwt_public_key_path are mutually exclusive",
            ));
        }

        if let Some(ref key_path) = self.jwt_public_key_path {
            let full_path = config_dir.join(key_path);
            if !full_path.exists() {
                return Err(ConfigError::identity(format!(
                    "identity.jwt_public_key_path not found: {}",
                    full_path.display()
                )));
            }
        }

        Ok(())
    }

    /// `{base_url}/realms/{realm}` with any trailing slash removed from the base
    pub fn realm_url(&self) -> String {
        format!("{}/realms/{}", self.base_url.trim_end_matches('/'), self.realm)
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
