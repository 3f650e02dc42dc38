use crate::{ConfigError, ConfigErrorResult, DEFAULT_TENANT_QUERY_PARAM};

use serde::Deserialize;

pub const MIN_LIST_PAGE_SIZE: u32 = 1;
pub const MAX_LIST_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_LIST_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TenantConfig {
    /// URL query parameter carrying an explicit tenant override
    pub query_param: String,
    /// Page size for the "list all tenants" fallback
    pub list_page_size: u32,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            query_param: String::from(DEFAULT_TENANT_QUERY_PARAM),
            list_page_size: DEFAULT_LIST_PAGE_SIZE,
        }
    }
}

impl TenantConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.query_param.trim().is_empty() {
            return Err(ConfigError::config("tenant.query_param cannot be empty"));
        }

        if self.list_page_size < MIN_LIST_PAGE_SIZE || self.list_page_size > MAX_LIST_PAGE_SIZE {
            return Err(ConfigError::config(format!(
                "tenant.list_page_size must be {}-{}, got {}",
                MIN_LIST_PAGE_SIZE, MAX_LIST_PAGE_SIZE, self.list_page_size
            )));
        }

        Ok(())
    }
}
