mod api_config;
mod auth_mode;
mod config;
mod error;
mod identity_config;
mod log_level;
mod logging_config;
mod retry_config;
mod session_config;
mod storage_config;
mod tenant_config;

#[cfg(test)]
mod tests;

pub use api_config::ApiConfig;
pub use auth_mode::AuthMode;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use identity_config::IdentityConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use retry_config::RetryConfig;
pub use session_config::SessionConfig;
pub use storage_config::StorageConfig;
pub use tenant_config::TenantConfig;

const CONFIG_DIR_ENV: &str = "KM_CONFIG_DIR";
const DEFAULT_CONFIG_DIR_NAME: &str = ".km";
const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_IDP_BASE_URL: &str = "http://localhost:8085";
const DEFAULT_IDP_REALM: &str = "kymatic";
const DEFAULT_IDP_CLIENT_ID: &str = "react-client";
const DEFAULT_IDP_REDIRECT_URI: &str = "http://localhost:5173/";
const DEFAULT_IDP_SCOPE: &str = "openid profile email";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8083";
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

const DEFAULT_TENANT_QUERY_PARAM: &str = "tenant";
const DEFAULT_STORAGE_FILENAME: &str = "session.json";

const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_COLORED: bool = true;
