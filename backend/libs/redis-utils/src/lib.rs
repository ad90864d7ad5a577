//! Redis connection handling shared by the gateway and member-service.
//!
//! The revocation store is on the gateway's hot path, so every command goes
//! through [`with_timeout`]: a slow Redis turns into a bounded, typed error
//! instead of a stalled request.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::{Client, IntoConnectionInfo, RedisError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// Shared Redis connection manager guarded by a Tokio mutex.
pub type SharedConnectionManager = Arc<Mutex<ConnectionManager>>;

/// Upper bound applied to a single command when callers don't configure one
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("redis command timed out after {0:?}")]
    Timeout(Duration),

    #[error("redis command failed: {0}")]
    Redis(#[from] RedisError),
}

/// Redis connection pool backed by a reconnecting `ConnectionManager`.
pub struct RedisPool {
    manager: SharedConnectionManager,
}

impl RedisPool {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let info = redis_url
            .into_connection_info()
            .context("failed to parse REDIS_URL connection string")?;
        let client = Client::open(info).context("failed to construct Redis client")?;
        let connection_manager = ConnectionManager::new(client)
            .await
            .context("failed to initialize Redis connection manager")?;

        info!("Redis connection manager initialized");

        Ok(Self {
            manager: Arc::new(Mutex::new(connection_manager)),
        })
    }

    pub fn manager(&self) -> SharedConnectionManager {
        self.manager.clone()
    }
}

/// Run a Redis command future, failing with `CommandError::Timeout` after `limit`.
///
/// Dropping the returned future abandons the in-flight command.
pub async fn with_timeout<F, T>(limit: Duration, fut: F) -> Result<T, CommandError>
where
    F: Future<Output = std::result::Result<T, RedisError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(CommandError::from),
        Err(_) => Err(CommandError::Timeout(limit)),
    }
}
