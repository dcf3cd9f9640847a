//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Deployment environment. Development enables sample data seeding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Where entities are persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    /// Process-local store; data is lost on restart.
    Memory,
}

/// Where token signing keys come from. Checked in this order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SigningKeySource {
    JwksPath(PathBuf),
    JwksUrl(String),
    RsaPublicKeyPem(String),
    /// Shared HS256 secret, for local development only.
    HmacSecret(String),
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub signing_key: SigningKeySource,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_backend: DatabaseBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub log_level: Level,
    pub environment: Environment,
    pub auth: AuthConfig,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required =
            |key: &str| var(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        // --- Load Server Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let environment = match var("APP_ENV").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("production") => Environment::Production,
            Some("development") | Some("dev") => Environment::Development,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "APP_ENV".to_string(),
                    format!("'{}' is not one of development, production", other),
                ))
            }
        };

        let cors_allowed_origin = var("CORS_ALLOWED_ORIGIN");

        // --- Load Database Settings ---
        let database_backend = match var("DATABASE_BACKEND").as_deref() {
            None | Some("postgres") => DatabaseBackend::Postgres,
            Some("memory") => DatabaseBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "DATABASE_BACKEND".to_string(),
                    format!("'{}' is not one of postgres, memory", other),
                ))
            }
        };
        let database_url = match database_backend {
            DatabaseBackend::Postgres => Some(required("DATABASE_URL")?),
            DatabaseBackend::Memory => var("DATABASE_URL"),
        };
        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string(), e.to_string())
            })?,
            None => 5,
        };

        // --- Load Token Validation Settings ---
        let signing_key = if let Some(path) = var("AUTH_JWKS_PATH") {
            SigningKeySource::JwksPath(PathBuf::from(path))
        } else if let Some(url) = var("AUTH_JWKS_URL") {
            SigningKeySource::JwksUrl(url)
        } else if let Some(pem) = var("AUTH_PUBLIC_KEY_PEM") {
            SigningKeySource::RsaPublicKeyPem(pem)
        } else if let Some(secret) = var("AUTH_HMAC_SECRET") {
            SigningKeySource::HmacSecret(secret)
        } else {
            return Err(ConfigError::MissingVar(
                "AUTH_JWKS_PATH, AUTH_JWKS_URL, AUTH_PUBLIC_KEY_PEM or AUTH_HMAC_SECRET".to_string(),
            ));
        };
        let auth = AuthConfig {
            issuer: required("AUTH_ISSUER")?,
            audience: required("AUTH_AUDIENCE")?,
            signing_key,
        };

        Ok(Self {
            bind_address,
            database_backend,
            database_url,
            db_max_connections,
            log_level,
            environment,
            auth,
            cors_allowed_origin,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const AUTH: [(&str, &str); 3] = [
        ("AUTH_ISSUER", "https://login.example.com/tenant/v2.0"),
        ("AUTH_AUDIENCE", "client-id"),
        ("AUTH_HMAC_SECRET", "dev-secret"),
    ];

    #[test]
    fn defaults_apply_for_optional_settings() {
        let mut pairs = AUTH.to_vec();
        pairs.push(("DATABASE_URL", "postgres://localhost/househeroes"));
        let config = load(&pairs).unwrap();

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.database_backend, DatabaseBackend::Postgres);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(
            config.auth.signing_key,
            SigningKeySource::HmacSecret("dev-secret".to_string())
        );
    }

    #[test]
    fn postgres_backend_requires_a_database_url() {
        let err = load(&AUTH).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "DATABASE_URL"));
    }

    #[test]
    fn memory_backend_needs_no_database_url() {
        let mut pairs = AUTH.to_vec();
        pairs.push(("DATABASE_BACKEND", "memory"));
        pairs.push(("APP_ENV", "Development"));
        let config = load(&pairs).unwrap();

        assert_eq!(config.database_backend, DatabaseBackend::Memory);
        assert!(config.is_development());
    }

    #[test]
    fn jwks_path_takes_precedence_over_other_key_sources() {
        let mut pairs = AUTH.to_vec();
        pairs.push(("DATABASE_BACKEND", "memory"));
        pairs.push(("AUTH_JWKS_PATH", "/etc/househeroes/jwks.json"));
        let config = load(&pairs).unwrap();

        assert_eq!(
            config.auth.signing_key,
            SigningKeySource::JwksPath(PathBuf::from("/etc/househeroes/jwks.json"))
        );
    }

    #[test]
    fn a_signing_key_source_is_required() {
        let err = load(&[
            ("AUTH_ISSUER", "issuer"),
            ("AUTH_AUDIENCE", "aud"),
            ("DATABASE_BACKEND", "memory"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut pairs = AUTH.to_vec();
        pairs.push(("DATABASE_BACKEND", "memory"));
        pairs.push(("BIND_ADDRESS", "not-an-address"));
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::InvalidValue(var, _)) if var == "BIND_ADDRESS"
        ));
    }
}
