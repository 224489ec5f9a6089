//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `PORTFOLIO` prefix and
//! nest with double underscores.
//!
//! # Example
//!
//! ```no_run
//! use portfolio::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod cache;
mod database;
mod error;
mod outbox;
mod redis;

pub use auth::AuthConfig;
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use outbox::OutboxConfig;
pub use redis::RedisConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Redis configuration (distributed cache)
    pub redis: RedisConfig,

    /// Outbox dispatcher configuration
    #[serde(default)]
    pub outbox: OutboxConfig,

    /// Cache TTL configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Identity provider configuration (Keycloak)
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (for development)
    /// 2. Reads variables with the `PORTFOLIO` prefix, `__` nesting
    ///    (`PORTFOLIO__DATABASE__URL`, `PORTFOLIO__OUTBOX__BATCH_SIZE`, ...)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PORTFOLIO")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.redis.validate()?;
        self.outbox.validate()?;
        self.cache.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}
