//! services/api/src/error.rs
//!
//! Startup and bootstrap failures of the HouseHeroes API binary. Request-time
//! failures never reach this type; they become GraphQL errors or HTTP statuses.

use crate::config::ConfigError;
use crate::web::auth::AuthError;
use househeroes_core::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed environment settings.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Seeding the store failed.
    #[error("Store error: {0}")]
    Port(#[from] PortError),

    /// Could not reach PostgreSQL.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The token signing keys could not be loaded.
    #[error("Token verifier setup failed: {0}")]
    Auth(#[from] AuthError),

    /// Binding or serving the listener.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Startup failed: {0}")]
    Internal(String),
}
