//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8400;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/shipguard";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default base URL of the remote protection API.
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://api.shipguard.example";

/// Default remote request timeout in seconds.
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

/// Missing-orders worker cadence (nominal: once daily).
pub const DEFAULT_MISSING_ORDERS_CRON: &str = "0 0 2 * * *";

/// Missing-shipments worker cadence (nominal: every 5 hours).
pub const DEFAULT_MISSING_SHIPMENTS_CRON: &str = "0 0 */5 * * *";

/// Webhook-validator worker cadence (nominal: every 5 hours).
pub const DEFAULT_WEBHOOK_VALIDATOR_CRON: &str = "0 30 */5 * * *";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub scheduler: SchedulerConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

/// Remote protection API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_token: String,
    pub timeout_secs: u64,
}

/// Cron expressions for the periodic reconciliation workers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub missing_orders_cron: String,
    pub missing_shipments_cron: String,
    pub webhook_validator_cron: String,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("SHIPGUARD_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("SHIPGUARD_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            },
            remote: RemoteConfig {
                base_url: std::env::var("SHIPGUARD_API_URL")
                    .unwrap_or_else(|_| DEFAULT_REMOTE_BASE_URL.to_string()),
                api_token: std::env::var("SHIPGUARD_API_TOKEN").unwrap_or_default(),
                timeout_secs: std::env::var("SHIPGUARD_API_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS),
            },
            scheduler: SchedulerConfig {
                enabled: std::env::var("SHIPGUARD_SCHEDULER_ENABLED")
                    .map(|v| v != "false" && v != "0")
                    .unwrap_or(true),
                missing_orders_cron: std::env::var("SHIPGUARD_MISSING_ORDERS_CRON")
                    .unwrap_or_else(|_| DEFAULT_MISSING_ORDERS_CRON.to_string()),
                missing_shipments_cron: std::env::var("SHIPGUARD_MISSING_SHIPMENTS_CRON")
                    .unwrap_or_else(|_| DEFAULT_MISSING_SHIPMENTS_CRON.to_string()),
                webhook_validator_cron: std::env::var("SHIPGUARD_WEBHOOK_VALIDATOR_CRON")
                    .unwrap_or_else(|_| DEFAULT_WEBHOOK_VALIDATOR_CRON.to_string()),
            },
        };

        Ok(config)
    }
}
