use serde::{Deserialize, Serialize};

/// `/api/tenant/info`: the tenant the backend bound this request to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantCurrentInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub status: String,
    pub active: bool,
}
