//! # Embryotech DB
//!
//! Database pool and migrations for the Embryotech API.
//!
//! This crate provides connection pool initialization using SQLx with
//! PostgreSQL, and applies the schema shipped in `migrations/` at startup.
//!
//! # Example
//!
//! ```ignore
//! use embryotech_config::DatabaseConfig;
//! use embryotech_db::{init_db_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = init_db_pool(&DatabaseConfig::try_from_env()?).await?;
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use anyhow::Context;
use embryotech_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;

/// Initializes a PostgreSQL connection pool.
///
/// The pool is cheaply cloneable and is shared by every repository through
/// the application state.
///
/// # Errors
///
/// Returns an error if the database cannot be reached within
/// `connect_timeout_secs`.
pub async fn init_db_pool(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.max_connections,
        "database pool initialized"
    );

    Ok(pool)
}

/// Applies pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("database migrations applied");
    Ok(())
}

/// Postgres `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

/// True when `err` is a unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

/// Name of the violated constraint, when the database reports one.
pub fn violated_constraint(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db_err| db_err.constraint())
        .map(str::to_string)
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
