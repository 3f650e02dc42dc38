use crate::{AuthError, Result as AuthErrorResult, RoleAccess};

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_TENANT_CLAIM_LENGTH: usize = 128;

/// JWT claims issued by the identity provider (or the local login endpoint)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user_id)
    #[serde(default)]
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Custom tenant claim mapped by the realm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Alternate spelling issued by the local login endpoint
    #[serde(
        default,
        rename = "tenantId",
        skip_serializing_if = "Option::is_none"
    )]
    pub tenant_id_camel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    /// Expiration timestamp (Unix)
    pub exp: i64,
    /// Issued at timestamp (Unix)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Global (realm-wide) roles
    #[serde(default)]
    pub realm_access: RoleAccess,
    /// Per-application roles keyed by client id
    #[serde(default)]
    pub resource_access: HashMap<String, RoleAccess>,
}

impl Claims {
    /// Validate claims after decoding
    #[track_caller]
    pub fn validate(&self) -> AuthErrorResult<()> {
        if self.sub.is_empty() {
            return Err(AuthError::invalid_claim(
                "sub",
                "sub (user_id) cannot be empty",
            ));
        }

        if self.exp <= 0 {
            return Err(AuthError::invalid_claim("exp", "exp must be a positive timestamp"));
        }

        if let Some(tenant) = self.tenant_claim()
            && tenant.len() > MAX_TENANT_CLAIM_LENGTH
        {
            return Err(AuthError::invalid_claim(
                "tenant_id",
                "tenant_id exceeds maximum length",
            ));
        }

        Ok(())
    }

    /// Tenant carried by the token: `tenant_id`, then `tenantId`, then `tenant`.
    /// Blank values are skipped.
    pub fn tenant_claim(&self) -> Option<&str> {
        [&self.tenant_id, &self.tenant_id_camel, &self.tenant]
            .into_iter()
            .filter_map(|value| value.as_deref())
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// Every non-blank tenant field in the token, in claim preference order.
    pub fn tenant_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for value in [&self.tenant_id, &self.tenant_id_camel, &self.tenant]
            .into_iter()
            .filter_map(|value| value.as_deref())
            .map(str::trim)
        {
            if !value.is_empty() && !fields.contains(&value) {
                fields.push(value);
            }
        }
        fields
    }

    /// Union of realm roles and the roles granted to `client_id`
    pub fn roles(&self, client_id: &str) -> BTreeSet<&str> {
        let realm_roles = self.realm_access.roles.iter();
        let client_roles = self
            .resource_access
            .get(client_id)
            .into_iter()
            .flat_map(|access| access.roles.iter());

        realm_roles.chain(client_roles).map(String::as_str).collect()
    }

    pub fn has_role(&self, role: &str, client_id: &str) -> bool {
        self.roles(client_id).contains(role)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Best display name: preferred_username, then email, then sub
    pub fn display_name(&self) -> &str {
        self.preferred_username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }
}
