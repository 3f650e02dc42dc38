use serde::Serialize;
use serde_json::{Map, Value};

pub const MIN_ADMIN_PASSWORD_LENGTH: usize = 8;

/// Caller-facing input for tenant creation
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub name: String,
    /// Derived from `name` when absent
    pub slug: Option<String>,
    pub subscription_tier: String,
    pub max_users: u32,
    pub max_storage_gb: u32,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_first_name: Option<String>,
    pub admin_last_name: Option<String>,
}

impl Default for NewTenant {
    fn default() -> Self {
        Self {
            name: String::new(),
            slug: None,
            subscription_tier: String::from("starter"),
            max_users: 10,
            max_storage_gb: 10,
            admin_email: String::new(),
            admin_password: String::new(),
            admin_first_name: None,
            admin_last_name: None,
        }
    }
}

/// `POST /api/tenants` body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub tenant_name: String,
    pub slug: String,
    pub subscription_tier: String,
    pub max_users: u32,
    pub max_storage_gb: u32,
    pub admin_user: AdminUser,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email_verified: bool,
}

impl CreateTenantRequest {
    pub fn new(tenant: &NewTenant, slug: String) -> Self {
        Self {
            tenant_name: tenant.name.clone(),
            slug,
            subscription_tier: tenant.subscription_tier.clone(),
            max_users: tenant.max_users,
            max_storage_gb: tenant.max_storage_gb,
            admin_user: AdminUser {
                email: tenant.admin_email.clone(),
                password: tenant.admin_password.clone(),
                first_name: tenant.admin_first_name.clone(),
                last_name: tenant.admin_last_name.clone(),
                email_verified: true,
            },
            metadata: Map::new(),
        }
    }
}
