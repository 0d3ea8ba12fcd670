//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Daily closing policy.
    #[serde(default)]
    pub closing: ClosingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations on startup.
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Business policy for daily bank closings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClosingConfig {
    /// How many days back from today a closing may still be performed.
    #[serde(default = "default_max_backdays")]
    pub max_backdays: u32,
    /// Halt the cascade recalculation at the first failing date.
    #[serde(default)]
    pub stop_on_error: bool,
    /// IANA time zone used to decide what "today" is.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_max_backdays() -> u32 {
    3
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

impl Default for ClosingConfig {
    fn default() -> Self {
        Self {
            max_backdays: default_max_backdays(),
            stop_on_error: false,
            timezone: default_timezone(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TREASURY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
