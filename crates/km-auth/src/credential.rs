use crate::{AuthError, Claims, ClaimsDecoder, Result as AuthErrorResult, TokenSet};

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Bearer token plus its parsed claims. Replaced wholesale on refresh.
#[derive(Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub claims: Claims,
}

impl Credential {
    /// Build a credential from a freshly issued token set.
    ///
    /// `previous_refresh_token` is kept when the provider does not rotate it.
    #[track_caller]
    pub fn from_token_set(
        token_set: TokenSet,
        decoder: &ClaimsDecoder,
        previous_refresh_token: Option<String>,
    ) -> AuthErrorResult<Self> {
        let claims = decoder.decode(&token_set.access_token)?;
        let expires_at = claims.expires_at().unwrap_or_else(|| {
            Utc::now() + TimeDelta::seconds(token_set.expires_in as i64)
        });

        Ok(Self {
            access_token: token_set.access_token,
            refresh_token: token_set.refresh_token.or(previous_refresh_token),
            expires_at,
            claims,
        })
    }

    /// Rebuild a credential from a token kept in durable storage
    #[track_caller]
    pub fn from_stored(
        access_token: String,
        refresh_token: Option<String>,
        decoder: &ClaimsDecoder,
    ) -> AuthErrorResult<Self> {
        let claims = decoder.decode(&access_token)?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| AuthError::invalid_claim("exp", "exp is out of range"))?;

        Ok(Self {
            access_token,
            refresh_token,
            expires_at,
            claims,
        })
    }

    /// Time left before expiry; negative once expired
    pub fn remaining_validity(&self, now: DateTime<Utc>) -> TimeDelta {
        self.expires_at - now
    }

    /// True when fewer than `window` remain (always true once expired)
    pub fn expires_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        self.remaining_validity(now) < window
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// Tokens never end up in logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .field("claims", &self.claims)
            .finish()
    }
}
