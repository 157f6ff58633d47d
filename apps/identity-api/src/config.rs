//! Application configuration loaded from environment variables.
//!
//! Required variables must be present and valid, or the application exits
//! with a clear error message.

use std::env;
use thiserror::Error;

/// Default JWT_SECRET for development. Production deployments must override
/// it; startup only warns so local setups keep working.
const INSECURE_JWT_SECRET: &str = "development-jwt-secret-change-in-production";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {message}")]
    InvalidVar { name: &'static str, message: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    /// Shared secret for verifying bearer tokens.
    pub jwt_secret: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Maximum database pool size.
    pub max_db_connections: u32,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;

        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| INSECURE_JWT_SECRET.to_string());
        if jwt_secret == INSECURE_JWT_SECRET {
            tracing::warn!(
                "JWT_SECRET is using the insecure development default; set it before deploying"
            );
        }

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let max_db_connections = match env::var("MAX_DB_CONNECTIONS") {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::InvalidVar {
                name: "MAX_DB_CONNECTIONS",
                message: format!("{e}"),
            })?,
            Err(_) => 10,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            max_db_connections,
        })
    }
}
