//! Configuration management
//!
//! Everything is read from the process environment (after `.env` is loaded by
//! `dotenvy`). Provider credentials, the database URL, and the token-signing
//! secret are required: a server that cannot reach its collaborators refuses
//! to start rather than failing per request.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::media::config::MediaConfig;
use crate::storage::config::StorageConfig;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Default admin token lifetime (30 days).
pub const DEFAULT_JWT_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Default bound on every external provider call.
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Default request body limit for multipart submissions (50 MiB).
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 50 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub media: MediaConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Admin authentication configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
    pub registration_enabled: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl_secs", &self.jwt_ttl_secs)
            .field("registration_enabled", &self.registration_enabled)
            .finish()
    }
}

/// Book ingestion policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Bound applied to each provider call
    pub timeout_secs: u64,
    /// Maximum accepted request body
    pub max_bytes: usize,
    /// Reject submissions without a cover before any upload happens
    pub require_cover: bool,
    /// Delete already-hosted assets when a later step fails
    pub cleanup_orphans: bool,
}

impl UploadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_UPLOAD_TIMEOUT_SECS,
            max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            require_cover: true,
            cleanup_orphans: true,
        }
    }
}

/// Read a required variable; empty counts as missing.
pub(crate) fn required_env(name: &str) -> anyhow::Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => anyhow::bail!("{} must be set", name),
    }
}

/// Read an optional variable, falling back to `default` when absent or empty.
/// A value that does not parse is an error.
pub(crate) fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: '{}' ({})", name, value.trim(), e)),
        _ => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Read the environment without touching `.env`
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server: ServerConfig {
                host: std::env::var("BOOKSHELF_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_or("BOOKSHELF_PORT", DEFAULT_SERVER_PORT)?,
                shutdown_timeout_secs: env_or(
                    "BOOKSHELF_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                )?,
            },
            database: DatabaseConfig {
                url: required_env("DATABASE_URL")?,
                max_connections: env_or(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                )?,
                min_connections: env_or(
                    "DATABASE_MIN_CONNECTIONS",
                    DEFAULT_DATABASE_MIN_CONNECTIONS,
                )?,
                connect_timeout_secs: env_or(
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                )?,
                idle_timeout_secs: env_or(
                    "DATABASE_IDLE_TIMEOUT",
                    DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", true)?,
            },
            storage: StorageConfig::from_env()?,
            media: MediaConfig::from_env()?,
            auth: AuthConfig {
                jwt_secret: required_env("JWT_SECRET")?,
                jwt_ttl_secs: env_or("JWT_TTL_SECS", DEFAULT_JWT_TTL_SECS)?,
                registration_enabled: env_or("ADMIN_REGISTRATION_ENABLED", true)?,
            },
            upload: UploadConfig {
                timeout_secs: env_or("UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS)?,
                max_bytes: env_or("UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES)?,
                require_cover: env_or("UPLOAD_REQUIRE_COVER", true)?,
                cleanup_orphans: env_or("UPLOAD_CLEANUP_ORPHANS", true)?,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.auth.jwt_secret.len() < 16 {
            anyhow::bail!("JWT_SECRET must be at least 16 characters");
        }

        if self.auth.jwt_ttl_secs == 0 {
            anyhow::bail!("JWT_TTL_SECS must be greater than 0");
        }

        if self.upload.timeout_secs == 0 {
            anyhow::bail!("UPLOAD_TIMEOUT_SECS must be greater than 0");
        }

        if self.upload.max_bytes == 0 {
            anyhow::bail!("UPLOAD_MAX_BYTES must be greater than 0");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}
