use serde::{Deserialize, Serialize};

/// `/api/me`: the backend's view of the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub subject: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Tenant the backend read from the bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id_from_jwt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
