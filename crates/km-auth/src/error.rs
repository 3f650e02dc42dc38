use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token: {message} {location}")]
    InvalidToken {
        message: String,
        location: ErrorLocation,
    },

    #[error("Token expired {location}")]
    TokenExpired { location: ErrorLocation },

    #[error("JWT decode failed: {source} {location}")]
    JwtDecode {
        #[source]
        source: jsonwebtoken::errors::Error,
        location: ErrorLocation,
    },

    #[error("Invalid claim '{claim}': {message} {location}")]
    InvalidClaim {
        claim: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid callback: {message} {location}")]
    InvalidCallback {
        message: String,
        location: ErrorLocation,
    },

    #[error("Identity provider rejected the request ({status}): {message} {location}")]
    Rejected {
        status: u16,
        message: String,
        location: ErrorLocation,
    },

    #[error("Identity provider request failed: {source} {location}")]
    Http {
        #[source]
        source: reqwest::Error,
        location: ErrorLocation,
    },

    #[error("Invalid identity provider response: {source} {location}")]
    Json {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("Identity provider configuration error: {message} {location}")]
    Configuration {
        message: String,
        location: ErrorLocation,
    },

    #[error("{operation} is not supported by the {provider} provider {location}")]
    Unsupported {
        operation: &'static str,
        provider: &'static str,
        location: ErrorLocation,
    },
}

impl AuthError {
    #[track_caller]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_claim(claim: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidClaim {
            claim: claim.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_callback(message: impl Into<String>) -> Self {
        Self::InvalidCallback {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
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

    #[track_caller]
    pub fn unsupported(operation: &'static str, provider: &'static str) -> Self {
        Self::Unsupported {
            operation,
            provider,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Message suitable for an error screen (no source locations).
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidToken { message, .. } => format!("Invalid token: {message}"),
            Self::TokenExpired { .. } => "Your session has expired.".to_string(),
            Self::JwtDecode { source, .. } => format!("Invalid token: {source}"),
            Self::InvalidClaim { claim, message, .. } => {
                format!("Invalid token claim '{claim}': {message}")
            }
            Self::InvalidCallback { message, .. } => format!("Authentication error: {message}"),
            Self::Rejected { message, .. } => format!("Authentication error: {message}"),
            Self::Http { source, .. } => {
                format!("Failed to reach the identity provider: {source}")
            }
            Self::Json { .. } => "The identity provider sent an unreadable response.".to_string(),
            Self::Configuration { message, .. } => message.clone(),
            Self::Unsupported {
                operation,
                provider,
                ..
            } => format!("{operation} is not available with {provider} sign-in."),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    #[track_caller]
    fn from(source: reqwest::Error) -> Self {
        Self::Http {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for AuthError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
