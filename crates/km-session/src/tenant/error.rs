use crate::StoreError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Tenant resolution failures. Scoped to the operation that needed a tenant.
#[derive(Error, Debug)]
pub enum TenantError {
    #[error("Authentication is required to resolve tenant ID. {location}")]
    Unauthenticated { location: ErrorLocation },

    #[error("Tenant ID could not be resolved (tried: {}) {location}", .tried.join(", "))]
    Unresolved {
        tried: Vec<String>,
        location: ErrorLocation,
    },

    #[error("Invalid tenant value '{value}' {location}")]
    InvalidTenant {
        value: String,
        location: ErrorLocation,
    },

    #[error("Session store error: {source} {location}")]
    Store {
        #[source]
        source: StoreError,
        location: ErrorLocation,
    },
}

impl TenantError {
    #[track_caller]
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unresolved(tried: Vec<String>) -> Self {
        Self::Unresolved {
            tried,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_tenant(value: impl Into<String>) -> Self {
        Self::InvalidTenant {
            value: value.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Inline message for the screen that needed the tenant
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated { .. } => {
                "Authentication is required to resolve tenant ID.".to_string()
            }
            Self::Unresolved { tried, .. } => {
                let tried = if tried.is_empty() {
                    "none".to_string()
                } else {
                    tried.join(", ")
                };
                format!(
                    "Tenant ID could not be resolved. Tried slugs: {tried}. \
                     Please ensure: (1) Your account has a tenant_id attribute in Keycloak, \
                     (2) The tenant exists in the database, or (3) Add ?tenant=<slug> to the URL."
                )
            }
            Self::InvalidTenant { value, .. } => format!("Invalid tenant value '{value}'."),
            Self::Store { source, .. } => source.recovery_hint().to_string(),
        }
    }
}

impl From<StoreError> for TenantError {
    #[track_caller]
    fn from(source: StoreError) -> Self {
        Self::Store {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TenantError>;
