use crate::{ConfigError, ConfigErrorResult};

use std::time::Duration;

use serde::Deserialize;

pub const MIN_REFRESH_INTERVAL_SECS: u64 = 1;
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 15;

pub const MAX_MIN_VALIDITY_SECS: u64 = 3600;
pub const DEFAULT_MIN_VALIDITY_SECS: u64 = 60;

/// Token refresh scheduling.
///
/// Every `refresh_interval_secs` the session checks the current token and
/// refreshes it when fewer than `min_validity_secs` remain.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub refresh_interval_secs: u64,
    pub min_validity_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            min_validity_secs: DEFAULT_MIN_VALIDITY_SECS,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.refresh_interval_secs < MIN_REFRESH_INTERVAL_SECS
            || self.refresh_interval_secs > MAX_REFRESH_INTERVAL_SECS
        {
            return Err(ConfigError::session(format!(
                "session.refresh_interval_secs must be {}-{}, got {}",
                MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS, self.refresh_interval_secs
            )));
        }

        if self.min_validity_secs > MAX_MIN_VALIDITY_SECS {
            return Err(ConfigError::session(format!(
                "session.min_validity_secs must be 0-{}, got {}",
                MAX_MIN_VALIDITY_SECS, self.min_validity_secs
            )));
        }

        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn min_validity(&self) -> Duration {
        Duration::from_secs(self.min_validity_secs)
    }
}
