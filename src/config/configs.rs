use anyhow::Result;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: Option<AuthConfig>,
    pub orders: OrdersConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_idle")]
    pub min_idle: u32,
    #[serde(default = "default_db_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_db_max_connections(),
            min_idle: default_db_min_idle(),
            connect_timeout_secs: default_db_connect_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
    /// Expected `aud` of Google ID tokens. Google login is rejected when unset.
    #[serde(default)]
    pub google_client_id: Option<String>,
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl_secs: default_access_ttl_secs(),
            refresh_ttl_days: default_refresh_ttl_days(),
            google_client_id: None,
            admin_email: None,
            admin_password: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrdersConfig {
    /// Offset applied to "now" when deciding which calendar day an invoice belongs to.
    pub business_utc_offset_minutes: i32,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            business_utc_offset_minutes: defaults::DEFAULT_BUSINESS_UTC_OFFSET_MINUTES,
        }
    }
}

impl OrdersConfig {
    pub fn business_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.business_utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }
}

fn default_db_max_connections() -> u32 {
    defaults::DEFAULT_DB_MAX_CONNECTIONS
}

fn default_db_min_idle() -> u32 {
    defaults::DEFAULT_DB_MIN_IDLE
}

fn default_db_connect_timeout_secs() -> u64 {
    defaults::DEFAULT_DB_CONNECT_TIMEOUT_SECS
}

fn default_access_ttl_secs() -> u64 {
    defaults::DEFAULT_ACCESS_TTL_SECS
}

fn default_refresh_ttl_days() -> i64 {
    defaults::DEFAULT_REFRESH_TTL_DAYS
}
