use serde::{Deserialize, Serialize};

/// A `{ "roles": [...] }` block as found in `realm_access` and `resource_access.<client>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}
