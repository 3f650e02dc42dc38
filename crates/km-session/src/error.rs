use crate::{StoreError, TenantError};

use std::panic::Location;

use error_location::ErrorLocation;
use km_auth::AuthError;
use km_client::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Authentication failed: {source} {location}")]
    Auth {
        #[source]
        source: AuthError,
        location: ErrorLocation,
    },

    #[error("Session store error: {source} {location}")]
    Store {
        #[source]
        source: StoreError,
        location: ErrorLocation,
    },

    #[error("Backend request failed: {source} {location}")]
    Client {
        #[source]
        source: ClientError,
        location: ErrorLocation,
    },

    #[error("Tenant resolution failed: {source} {location}")]
    Tenant {
        #[source]
        source: TenantError,
        location: ErrorLocation,
    },

    #[error("Not authenticated {location}")]
    NotAuthenticated { location: ErrorLocation },

    #[error("Session configuration error: {message} {location}")]
    Configuration {
        message: String,
        location: ErrorLocation,
    },
}

impl SessionError {
    #[track_caller]
    pub fn not_authenticated() -> Self {
        Self::NotAuthenticated {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Message for the user, without source locations
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth { source, .. } => source.user_message(),
            Self::Store { source, .. } => source.recovery_hint().to_string(),
            Self::Client { source, .. } => source.user_message(),
            Self::Tenant { source, .. } => source.user_message(),
            Self::NotAuthenticated { .. } => "You are not signed in.".to_string(),
            Self::Configuration { message, .. } => message.clone(),
        }
    }
}

impl From<AuthError> for SessionError {
    #[track_caller]
    fn from(source: AuthError) -> Self {
        Self::Auth {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<StoreError> for SessionError {
    #[track_caller]
    fn from(source: StoreError) -> Self {
        Self::Store {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ClientError> for SessionError {
    #[track_caller]
    fn from(source: ClientError) -> Self {
        Self::Client {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<TenantError> for SessionError {
    #[track_caller]
    fn from(source: TenantError) -> Self {
        Self::Tenant {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
