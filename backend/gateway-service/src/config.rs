use crate::routes::RouteTable;
use anyhow::{bail, Context, Result};
use jwt_security::KeyMode;
use std::env;
use std::time::Duration;

/// Gateway configuration
#[derive(Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt_secret: String,
    pub internal_secret: String,
    pub redis: RedisConfig,
    pub routes: RouteTable,
    pub upstream_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server)
            .field("jwt_secret", &"<redacted>")
            .field("internal_secret", &"<redacted>")
            .field("redis", &self.redis)
            .field("routes", &self.routes)
            .field("upstream_timeout", &self.upstream_timeout)
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

        let routes = match env::var("GATEWAY_ROUTES") {
            Ok(spec) => RouteTable::parse(&spec).context("Invalid GATEWAY_ROUTES")?,
            Err(_) => RouteTable::default(),
        };

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .context("Invalid SERVER_PORT")?,
                workers: match env::var("SERVER_WORKERS") {
                    Ok(value) => value.parse().context("Invalid SERVER_WORKERS")?,
                    Err(_) => num_cpus::get(),
                },
            },
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            internal_secret,
            redis: RedisConfig {
                url: env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
                command_timeout: Duration::from_millis(
                    env::var("REDIS_TIMEOUT_MS")
                        .unwrap_or_else(|_| "200".to_string())
                        .parse()
                        .context("Invalid REDIS_TIMEOUT_MS")?,
                ),
                key_mode: match env::var("REVOCATION_KEY_MODE") {
                    Ok(value) => value
                        .parse::<KeyMode>()
                        .map_err(anyhow::Error::msg)
                        .context("Invalid REVOCATION_KEY_MODE")?,
                    Err(_) => KeyMode::default(),
                },
            },
            routes,
            upstream_timeout: Duration::from_secs(
                env::var("UPSTREAM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("Invalid UPSTREAM_TIMEOUT_SECS")?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "SERVER_HOST",
        "SERVER_PORT",
        "SERVER_WORKERS",
        "JWT_SECRET",
        "INTERNAL_SECRET_KEY",
        "REDIS_URL",
        "REDIS_TIMEOUT_MS",
        "REVOCATION_KEY_MODE",
        "GATEWAY_ROUTES",
        "UPSTREAM_TIMEOUT_SECS",
    ];

    fn reset_env() {
        for var in VARS {
            env::remove_var(var);
        }
        env::set_var("JWT_SECRET", "Qm9vTrP3kLw7xNc2Hj8VbF5dGs1ZaYe6Ut4R");
        env::set_var("INTERNAL_SECRET_KEY", "internal");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        reset_env();

        let config = Config::from_env().unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert!(config.server.workers >= 1);
        assert_eq!(config.redis.url, "redis://127.0.0.1:6379");
        assert_eq!(config.redis.command_timeout, Duration::from_millis(200));
        assert_eq!(config.redis.key_mode, KeyMode::Raw);
        assert_eq!(config.routes, RouteTable::default());
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_custom_routes_and_key_mode() {
        reset_env();
        env::set_var("GATEWAY_ROUTES", "/auth=http://localhost:8081;public");
        env::set_var("REVOCATION_KEY_MODE", "sha256");
        env::set_var("REDIS_TIMEOUT_MS", "50");

        let config = Config::from_env().unwrap();
        assert_eq!(config.routes.routes().len(), 1);
        assert_eq!(config.redis.key_mode, KeyMode::Sha256);
        assert_eq!(config.redis.command_timeout, Duration::from_millis(50));

        reset_env();
    }

    #[test]
    #[serial]
    fn test_invalid_configuration() {
        reset_env();
        env::set_var("GATEWAY_ROUTES", "member=http://localhost:8081");
        assert!(Config::from_env().is_err());

        reset_env();
        env::remove_var("JWT_SECRET");
        assert!(Config::from_env().is_err());

        reset_env();
        env::set_var("INTERNAL_SECRET_KEY", "");
        assert!(Config::from_env().is_err());

        reset_env();
    }

    #[test]
    #[serial]
    fn test_debug_redacts_secrets() {
        reset_env();
        let config = Config::from_env().unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("Qm9vTrP3kLw7xNc2Hj8VbF5dGs1ZaYe6Ut4R"));
        assert!(debug.contains("<redacted>"));
    }
}
