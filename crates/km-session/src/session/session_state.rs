use serde::Serialize;
use url::Url;

/// Authentication lifecycle state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Initializing,
    ProcessingCallback,
    Authenticated,
    /// Control was handed to the identity provider
    RedirectPending { url: Url },
    Error { message: String },
    LoggedOut,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SessionState::Error { message } => Some(message),
            _ => None,
        }
    }
}
