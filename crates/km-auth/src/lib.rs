pub mod auth_callback;
pub mod claims;
pub mod claims_decoder;
pub mod credential;
pub mod error;
pub mod identity_provider;
pub mod jwt_algorithm;
pub mod local_provider;
pub mod oidc_provider;
pub mod pending_login;
pub mod pkce;
pub mod provider_factory;
pub mod role_access;
pub mod token_set;

pub use auth_callback::{AuthCallback, clean_callback_url};
pub use claims::Claims;
pub use claims_decoder::ClaimsDecoder;
pub use credential::Credential;
pub use error::{AuthError, Result};
pub use identity_provider::IdentityProvider;
pub use jwt_algorithm::JwtAlgorithm;
pub use local_provider::LocalAuthProvider;
pub use oidc_provider::OidcProvider;
pub use pending_login::PendingLogin;
pub use pkce::PkceChallenge;
pub use provider_factory::{build_decoder, build_provider};
pub use role_access::RoleAccess;
pub use token_set::TokenSet;

pub use url::Url;

#[cfg(test)]
mod tests;
