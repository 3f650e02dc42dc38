use crate::PkceChallenge;
use crate::pkce::random_token;

use serde::{Deserialize, Serialize};

/// State kept between the login redirect and the callback.
///
/// Persisted so that the process handling the callback (possibly a new one)
/// can finish the code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLogin {
    pub state: String,
    pub code_verifier: String,
    pub redirect_uri: String,
    pub created_at: i64,
}

impl PendingLogin {
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        let pkce = PkceChallenge::generate();
        Self {
            state: random_token(),
            code_verifier: pkce.verifier().to_string(),
            redirect_uri: redirect_uri.into(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn challenge(&self) -> PkceChallenge {
        PkceChallenge::from_verifier(self.code_verifier.clone())
    }
}
