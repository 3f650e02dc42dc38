use crate::{
    AuthError, ClaimsDecoder, IdentityProvider, LocalAuthProvider, OidcProvider,
    Result as AuthErrorResult,
};

use std::sync::Arc;

use km_config::{AuthMode, Config};
use log::info;

/// Build the identity provider selected by `identity.mode`
pub fn build_provider(config: &Config) -> AuthErrorResult<Arc<dyn IdentityProvider>> {
    let timeout = config.api.timeout();

    let provider: Arc<dyn IdentityProvider> = match config.identity.mode {
        AuthMode::Oidc => Arc::new(OidcProvider::new(&config.identity, timeout)?),
        AuthMode::Local => Arc::new(LocalAuthProvider::new(
            &config.api.base_url,
            &config.identity.client_id,
            config.identity.login_page.as_deref(),
            timeout,
        )?),
    };

    info!("Identity provider: {}", provider.name());
    Ok(provider)
}

/// Build the claims decoder: verifying when key material is configured
pub fn build_decoder(config: &Config) -> AuthErrorResult<ClaimsDecoder> {
    if let Some(ref secret) = config.identity.jwt_secret {
        return Ok(ClaimsDecoder::with_hs256(secret.as_bytes()));
    }

    let key_path = config
        .public_key_path()
        .map_err(|e| AuthError::configuration(e.to_string()))?;

    match key_path {
        Some(path) => {
            let pem = std::fs::read_to_string(&path).map_err(|e| {
                AuthError::configuration(format!(
                    "Failed to read public key from {}: {}",
                    path.display(),
                    e
                ))
            })?;
            ClaimsDecoder::with_rs256(&pem)
        }
        None => Ok(ClaimsDecoder::unverified()),
    }
}
