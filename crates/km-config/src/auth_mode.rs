use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How the console obtains credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Redirect-based authorization code flow with PKCE
    #[default]
    Oidc,
    /// Email/password login against the backend's own auth endpoints
    Local,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "oidc" | "keycloak" => Ok(AuthMode::Oidc),
            "local" => Ok(AuthMode::Local),
            other => Err(format!("unknown auth mode '{other}'")),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Oidc => write!(f, "oidc"),
            AuthMode::Local => write!(f, "local"),
        }
    }
}
