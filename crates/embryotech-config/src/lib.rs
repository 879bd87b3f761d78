//! # Embryotech Config
//!
//! Configuration types for the Embryotech API.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token signing secret and lifetime
//! - [`database`]: PostgreSQL connection settings
//! - [`server`]: bind address
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`rate_limit`]: rate limiting for the login and registration endpoints
//! - [`audit`]: audit log query limits
//! - [`password`]: password hashing cost
//!
//! Required values (`JWT_SECRET`, `DATABASE_URL`) produce a [`ConfigError`]
//! when absent. Everything else falls back to a default.
//!
//! # Example
//!
//! ```ignore
//! use embryotech_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::try_from_env()?;
//! println!("listening on {}", config.server.addr());
//! ```

pub mod audit;
pub mod cors;
pub mod database;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod server;

use std::str::FromStr;

use thiserror::Error;

// Re-export commonly used types at crate root
pub use audit::AuditConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use password::PasswordConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Every configuration section, loaded once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub audit: AuditConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::try_from_env()?,
            jwt: JwtConfig::try_from_env()?,
            cors: CorsConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            audit: AuditConfig::from_env(),
            password: PasswordConfig::from_env(),
        })
    }
}

/// Reads and parses an optional variable, falling back to `default` when unset
/// or unparsable.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| {
            let v = v.trim().to_lowercase();
            v != "false" && v != "0"
        })
        .unwrap_or(default)
}

pub(crate) fn env_required(key: &'static str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key)),
    }
}
