use clap::{Parser, ValueEnum};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::time::Duration;

use crate::api::AuthKey;

/// Where orders are persisted.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process memory; nothing survives a restart
    Memory,
}

/// Command-line and environment configuration for the order service.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Pizza order management API", long_about = None)]
pub struct Config {
    /// Storage backend
    #[arg(long, env = "APP_STORAGE", value_enum, default_value_t = StorageBackend::Postgres)]
    pub storage: StorageBackend,

    /// Catalog item ids known to the memory backend, comma separated
    #[arg(long, env = "APP_MEMORY_CATALOG", value_delimiter = ',', default_values_t = [1, 2, 3, 4, 5])]
    pub memory_catalog: Vec<i32>,

    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = "postgres")]
    pub db_name: String,

    /// Full connection URL; overrides the individual DB_* settings
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_max_connections: u32,

    /// Address to listen on
    #[arg(long, env = "APP_HOSTNAME", default_value = "0.0.0.0")]
    pub hostname: String,

    /// Port to listen on
    #[arg(long, env = "APP_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Hex SHA3-256 digest of the X-Auth-Key value
    #[arg(long, env = "APP_AUTH_KEY_SHA3", hide_env_values = true)]
    pub auth_key_sha3: String,

    /// Per-request deadline in seconds (0 disables it)
    #[arg(long, env = "APP_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Seconds in-flight requests may keep running after Ctrl-C before their
    /// store operations are cancelled
    #[arg(long, env = "APP_SHUTDOWN_GRACE_SECS", default_value_t = 30)]
    pub shutdown_grace_secs: u64,

    /// Create the order tables on startup if missing
    #[arg(long, env = "APP_APPLY_SCHEMA", default_value_t = true, action = clap::ArgAction::Set)]
    pub apply_schema: bool,
}

impl Config {
    /// Connection options for the pool. The DB_* parts are passed as fields,
    /// never spliced into a URL, so reserved characters stay literal.
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.database_url {
            return Ok(url.parse::<PgConnectOptions>()?);
        }

        Ok(PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name)
            .ssl_mode(PgSslMode::Disable))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn auth_key(&self) -> anyhow::Result<AuthKey> {
        AuthKey::from_hex_digest(&self.auth_key_sha3).map_err(anyhow::Error::msg)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.hostname.clone(), self.port)
    }
}
