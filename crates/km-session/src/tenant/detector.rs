use crate::{SessionStore, StorageKey};

use std::sync::Arc;

use log::{debug, warn};
use url::{Host, Url};

/// Finds the tenant the user is pointing at, before any backend call.
///
/// Priority: `?tenant=` query parameter (persisted as the new override),
/// then the persisted override, then the hostname's subdomain.
#[derive(Clone)]
pub struct TenantDetector {
    store: Arc<dyn SessionStore>,
    query_param: String,
}

impl TenantDetector {
    pub fn new(store: Arc<dyn SessionStore>, query_param: impl Into<String>) -> Self {
        Self {
            store,
            query_param: query_param.into(),
        }
    }

    pub fn detect(&self, url: &Url) -> Option<String> {
        if let Some(tenant) = self.from_query(url) {
            if let Err(e) = self.store.set(StorageKey::TenantOverride, &tenant) {
                warn!("Failed to persist tenant override '{}': {}", tenant, e);
            }
            debug!("Tenant '{}' detected from query parameter", tenant);
            return Some(tenant);
        }

        match self.store.get(StorageKey::TenantOverride) {
            Ok(Some(tenant)) if !tenant.trim().is_empty() => {
                return Some(tenant.trim().to_string());
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to read tenant override: {}", e),
        }

        subdomain_tenant(url)
    }

    fn from_query(&self, url: &Url) -> Option<String> {
        url.query_pairs()
            .find(|(key, _)| key == self.query_param.as_str())
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// `acme.console.example.com` -> `acme`, `acme.localhost` -> `acme`.
/// Bare hosts, `localhost`, and IP addresses carry no tenant.
pub fn subdomain_tenant(url: &Url) -> Option<String> {
    let domain = match url.host()? {
        Host::Domain(domain) => domain,
        Host::Ipv4(_) | Host::Ipv6(_) => return None,
    };

    let parts: Vec<&str> = domain.split('.').collect();
    let is_local_subdomain = parts.len() == 2 && parts[1] == "localhost";

    if (parts.len() >= 3 || is_local_subdomain) && !parts[0].is_empty() {
        Some(parts[0].to_string())
    } else {
        None
    }
}
