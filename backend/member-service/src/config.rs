//! Configuration management for member-service
//!
//! Loaded once at startup from environment variables (after `.env` in
//! development) and passed to components by injection.

use anyhow::{bail, Context, Result};
use jwt_security::KeyMode;
use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub redis: RedisConfig,
    pub internal_secret: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("jwt", &self.jwt)
            .field("redis", &self.redis)
            .field("internal_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: chrono::Duration,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub command_timeout: Duration,
    pub key_mode: KeyMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let internal_secret =
            env::var("INTERNAL_SECRET_KEY").context("INTERNAL_SECRET_KEY must be set")?;
        if internal_secret.trim().is_empty() {
            bail!("INTERNAL_SECRET_KEY must not be empty");
        }

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            internal_secret,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8081".to_string())
                .parse()
                .context("Invalid SERVER_PORT")?,
            workers: match env::var("SERVER_WORKERS") {
                Ok(value) => value.parse().context("Invalid SERVER_WORKERS")?,
                Err(_) => num_cpus::get(),
            },
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
        })
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self> {
        let expiration_ms: i64 = env::var("JWT_EXPIRATION_MS")
            .unwrap_or_else(|_| "3600000".to_string())
            .parse()
            .context("Invalid JWT_EXPIRATION_MS")?;
        if expiration_ms <= 0 {
            bail!("JWT_EXPIRATION_MS must be positive");
        }

        Ok(Self {
            secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            expiration: chrono::Duration::milliseconds(expiration_ms),
        })
    }
}

impl RedisConfig {
    fn from_env() -> Result<Self> {
        let timeout_ms: u64 = env::var("REDIS_TIMEOUT_MS")
            .unwrap_or_else(|_| "200".to_string())
            .parse()
            .context("Invalid REDIS_TIMEOUT_MS")?;

        let key_mode = match env::var("REVOCATION_KEY_MODE") {
            Ok(value) => value
                .parse::<KeyMode>()
                .map_err(anyhow::Error::msg)
                .context("Invalid REVOCATION_KEY_MODE")?,
            Err(_) => KeyMode::default(),
        };

        Ok(Self {
            url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            command_timeout: Duration::from_millis(timeout_ms),
            key_mode,
        })
    }
}
