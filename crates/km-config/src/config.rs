use crate::{
    ApiConfig, CONFIG_DIR_ENV, CONFIG_FILE_NAME, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR_NAME, IdentityConfig, LoggingConfig, RetryConfig, SessionConfig,
    StorageConfig, TenantConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub identity: IdentityConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub tenant: TenantConfig,
    pub retry: RetryConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for KM_CONFIG_DIR env var, else use ./.km/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply KM_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: KM_CONFIG_DIR env var > ./.km/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR_NAME))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let config_dir = Self::config_dir()?;

        self.identity.validate(&config_dir)?;
        self.api.validate()?;
        self.session.validate()?;
        self.tenant.validate()?;
        self.retry.validate()?;
        self.storage.validate()?;

        Ok(())
    }

    /// Absolute path of the session store file.
    pub fn storage_path(&self) -> ConfigErrorResult<PathBuf> {
        Ok(Self::config_dir()?.join(&self.storage.path))
    }

    /// Absolute path of the RS256 public key, when configured.
    pub fn public_key_path(&self) -> ConfigErrorResult<Option<PathBuf>> {
        match self.identity.jwt_public_key_path {
            Some(ref path) => Ok(Some(Self::config_dir()?.join(path))),
            None => Ok(None),
        }
    }

    /// Log configuration summary (NEVER logs secrets).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  identity: {} realm={} client={} ({})",
            self.identity.base_url, self.identity.realm, self.identity.client_id, self.identity.mode
        );

        let verification = if self.identity.jwt_secret.is_some() {
            "HS256"
        } else if self.identity.jwt_public_key_path.is_some() {
            "RS256"
        } else {
            "none"
        };
        info!("  token signature verification: {}", verification);

        info!(
            "  api: {} (timeout {}s)",
            self.api.base_url, self.api.timeout_secs
        );
        info!(
            "  session: refresh every {}s, min validity {}s",
            self.session.refresh_interval_secs, self.session.min_validity_secs
        );
        info!(
            "  tenant: query_param={}, list_page_size={}",
            self.tenant.query_param, self.tenant.list_page_size
        );
        info!(
            "  retry: attempts={}, delay={}ms",
            self.retry.max_attempts, self.retry.delay_ms
        );
        info!("  storage: {}", self.storage.path);
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Identity provider
        Self::apply_env_parse("KM_IDP_MODE", &mut self.identity.mode);
        Self::apply_env_string("KM_IDP_BASE_URL", &mut self.identity.base_url);
        Self::apply_env_string("KM_IDP_REALM", &mut self.identity.realm);
        Self::apply_env_string("KM_IDP_CLIENT_ID", &mut self.identity.client_id);
        Self::apply_env_string("KM_IDP_REDIRECT_URI", &mut self.identity.redirect_uri);
        Self::apply_env_string("KM_IDP_SCOPE", &mut self.identity.scope);
        Self::apply_env_option_string("KM_IDP_LOGIN_PAGE", &mut self.identity.login_page);
        Self::apply_env_option_string("KM_IDP_JWT_SECRET", &mut self.identity.jwt_secret);
        Self::apply_env_option_string(
            "KM_IDP_JWT_PUBLIC_KEY_PATH",
            &mut self.identity.jwt_public_key_path,
        );

        // API
        Self::apply_env_string("KM_API_BASE_URL", &mut self.api.base_url);
        Self::apply_env_parse("KM_API_TIMEOUT_SECS", &mut self.api.timeout_secs);

        // Session
        Self::apply_env_parse(
            "KM_SESSION_REFRESH_INTERVAL_SECS",
            &mut self.session.refresh_interval_secs,
        );
        Self::apply_env_parse(
            "KM_SESSION_MIN_VALIDITY_SECS",
            &mut self.session.min_validity_secs,
        );

        // Tenant
        Self::apply_env_string("KM_TENANT_QUERY_PARAM", &mut self.tenant.query_param);
        Self::apply_env_parse(
            "KM_TENANT_LIST_PAGE_SIZE",
            &mut self.tenant.list_page_size,
        );

        // Retry
        Self::apply_env_parse("KM_RETRY_MAX_ATTEMPTS", &mut self.retry.max_attempts);
        Self::apply_env_parse("KM_RETRY_DELAY_MS", &mut self.retry.delay_ms);

        // Storage
        Self::apply_env_string("KM_STORAGE_PATH", &mut self.storage.path);

        // Logging
        Self::apply_env_parse("KM_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_option_string("KM_LOG_FILE", &mut self.logging.file);
        Self::apply_env_bool("KM_LOG_COLORED", &mut self.logging.colored);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
