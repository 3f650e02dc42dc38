use serde::{Deserialize, Serialize};

const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;
const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Token endpoint response.
///
/// Accepts both the OAuth snake_case field names and the camelCase names
/// returned by the local login endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenSet {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in", alias = "expiresIn")]
    pub expires_in: u64,
    #[serde(default = "default_token_type", alias = "tokenType")]
    pub token_type: String,
}

fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN_SECS
}

fn default_token_type() -> String {
    String::from(DEFAULT_TOKEN_TYPE)
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}
