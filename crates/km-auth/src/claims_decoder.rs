use crate::{AuthError, Claims, JwtAlgorithm, Result as AuthErrorResult};

use std::panic::Location;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use error_location::ErrorLocation;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

/// Turns a bearer token into [`Claims`].
///
/// Tokens reach the console straight from the identity provider over TLS, so
/// by default the payload is decoded without checking the signature (the
/// backend verifies every request anyway). When key material is configured
/// the signature is verified as well.
pub struct ClaimsDecoder {
    verifier: Option<Verifier>,
}

struct Verifier {
    decoding_key: DecodingKey,
    validation: Validation,
    algorithm: Algorithm,
}

impl ClaimsDecoder {
    /// Decode payloads without signature verification
    pub fn unverified() -> Self {
        Self { verifier: None }
    }

    /// Verify with HS256 (symmetric secret)
    pub fn with_hs256(secret: &[u8]) -> Self {
        Self {
            verifier: Some(Verifier {
                decoding_key: DecodingKey::from_secret(secret),
                validation: Self::validation(Algorithm::HS256),
                algorithm: Algorithm::HS256,
            }),
        }
    }

    /// Verify with RS256 (asymmetric public key)
    #[track_caller]
    pub fn with_rs256(public_key_pem: &str) -> AuthErrorResult<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| AuthError::invalid_token(format!("Invalid RSA public key: {}", e)))?;

        Ok(Self {
            verifier: Some(Verifier {
                decoding_key,
                validation: Self::validation(Algorithm::RS256),
                algorithm: Algorithm::RS256,
            }),
        })
    }

    #[track_caller]
    pub fn from_algorithm(algorithm: &JwtAlgorithm) -> AuthErrorResult<Self> {
        match algorithm {
            JwtAlgorithm::HS256 { secret } => Ok(Self::with_hs256(secret)),
            JwtAlgorithm::RS256 { public_key_pem } => Self::with_rs256(public_key_pem),
        }
    }

    // Expiry is judged by the session (refresh window), not here
    fn validation(algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 30;
        validation
    }

    /// Decode the token and validate its claims
    #[track_caller]
    pub fn decode(&self, token: &str) -> AuthErrorResult<Claims> {
        let claims = match self.verifier {
            Some(ref verifier) => {
                decode::<Claims>(token, &verifier.decoding_key, &verifier.validation)
                    .map_err(|e| AuthError::JwtDecode {
                        source: e,
                        location: ErrorLocation::from(Location::caller()),
                    })?
                    .claims
            }
            None => Self::decode_payload(token)?,
        };

        claims.validate()?;

        Ok(claims)
    }

    #[track_caller]
    fn decode_payload(token: &str) -> AuthErrorResult<Claims> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
            _ => return Err(AuthError::invalid_token("expected three dot-separated segments")),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| AuthError::invalid_token(format!("payload is not base64url: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::invalid_token(format!("payload is not valid claims JSON: {e}")))
    }

    /// Get the algorithm being used (for logging/debugging)
    pub fn algorithm(&self) -> &str {
        match self.verifier.as_ref().map(|v| v.algorithm) {
            Some(Algorithm::HS256) => "HS256",
            Some(Algorithm::RS256) => "RS256",
            Some(_) => "unknown",
            None => "unverified",
        }
    }
}
