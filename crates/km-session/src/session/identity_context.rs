use crate::SessionState;

use km_auth::Claims;
use serde::Serialize;

/// Read-only snapshot of the session, published on every change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityContext {
    pub state: SessionState,
    pub authenticated: bool,
    /// Never serialized
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<Claims>,
    /// Tenant candidate derived from the token (claim, else detected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Bumped on every logout
    pub epoch: u64,
}

impl IdentityContext {
    pub fn new(state: SessionState, epoch: u64) -> Self {
        Self {
            error: state.error_message().map(String::from),
            authenticated: state.is_authenticated(),
            state,
            token: None,
            claims: None,
            tenant: None,
            epoch,
        }
    }

    pub fn has_role(&self, role: &str, client_id: &str) -> bool {
        self.authenticated
            && self
                .claims
                .as_ref()
                .is_some_and(|claims| claims.has_role(role, client_id))
    }
}
