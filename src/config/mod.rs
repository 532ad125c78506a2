//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `CHURCH_PORTAL`
//! prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use church_portal::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod aggregation;
mod database;
mod error;
mod server;

pub use aggregation::AggregationConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Listing row cap, trend length and snapshot cache
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `CHURCH_PORTAL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CHURCH_PORTAL__DATABASE__URL=...` -> `database.url = ...`
    /// - `CHURCH_PORTAL__AGGREGATION__CACHE_TTL_SECS=30`
    /// - `CHURCH_PORTAL__AGGREGATION__CACHE_MAX_ENTRIES=10000`
    ///
    /// A `.env` file is read first when present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHURCH_PORTAL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.aggregation.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
