use crate::{AuthError, PendingLogin, Result as AuthErrorResult, TokenSet};

use async_trait::async_trait;
use url::Url;

/// Where credentials come from.
///
/// The session manager drives the login lifecycle; implementations only
/// build URLs and talk to the token endpoints.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short name for logs and error messages
    fn name(&self) -> &'static str;

    fn client_id(&self) -> &str;

    /// Whether `login_url` expects a PKCE `PendingLogin` to be persisted
    fn uses_pkce(&self) -> bool;

    /// Where to send the user to sign in. `None` when the provider has no
    /// redirect-based login.
    fn login_url(&self, pending: &PendingLogin) -> AuthErrorResult<Option<Url>>;

    /// End-session URL to visit after local state is cleared
    fn logout_url(&self) -> Option<Url>;

    /// Trade an authorization code for tokens
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> AuthErrorResult<TokenSet>;

    async fn refresh(&self, refresh_token: &str) -> AuthErrorResult<TokenSet>;

    /// Direct credential login (no redirect)
    async fn password_login(
        &self,
        _email: &str,
        _password: &str,
        _tenant: Option<&str>,
    ) -> AuthErrorResult<TokenSet> {
        Err(AuthError::unsupported("Password login", self.name()))
    }
}
