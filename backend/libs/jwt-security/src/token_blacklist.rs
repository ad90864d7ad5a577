//! Token blacklist for bearer-token revocation using Redis
//!
//! Revoked tokens stay blacklisted until the moment they would have expired
//! anyway, then Redis evicts them.

use async_trait::async_trait;
use chrono::Duration;
use crypto_core::hash::{fingerprint, sha256_hex};
use redis_utils::{with_timeout, CommandError, SharedConnectionManager, DEFAULT_COMMAND_TIMEOUT};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Namespace tag for revocation keys
pub const BLACKLIST_PREFIX: &str = "BL:";

/// Value stored under a revocation key; only existence matters
pub const REVOKED_MARKER: &str = "logout";

#[derive(Debug, Error)]
pub enum BlacklistError {
    #[error("revocation store unavailable: {0}")]
    Unavailable(#[from] CommandError),
}

/// How the token is turned into key material
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyMode {
    /// `BL:<raw token>`
    #[default]
    Raw,
    /// `BL:<hex sha256 of token>`, keeps bearer plaintext out of the store
    Sha256,
}

impl FromStr for KeyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(KeyMode::Raw),
            "sha256" => Ok(KeyMode::Sha256),
            other => Err(format!("unknown revocation key mode: {other}")),
        }
    }
}

/// Build the namespaced store key for `token`
pub fn blacklist_key(token: &str, mode: KeyMode) -> String {
    match mode {
        KeyMode::Raw => format!("{BLACKLIST_PREFIX}{token}"),
        KeyMode::Sha256 => format!("{BLACKLIST_PREFIX}{}", sha256_hex(token)),
    }
}

/// Revocation store contract shared by the gateway and member-service
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Record `token` as revoked for exactly `remaining`.
    ///
    /// No-op when `remaining` is zero or negative: an expired token needs no entry.
    async fn revoke(&self, token: &str, remaining: Duration) -> Result<(), BlacklistError>;

    /// Whether a live revocation entry exists for `token`
    async fn is_revoked(&self, token: &str) -> Result<bool, BlacklistError>;
}

/// Remaining lifetime in whole milliseconds, `None` when nothing is left
pub(crate) fn positive_millis(remaining: Duration) -> Option<u64> {
    let ms = remaining.num_milliseconds();
    (ms > 0).then_some(ms as u64)
}

/// Token blacklist backed by Redis `SET ... PX` / `EXISTS`
#[derive(Clone)]
pub struct RedisTokenBlacklist {
    redis: SharedConnectionManager,
    key_mode: KeyMode,
    command_timeout: std::time::Duration,
}

impl RedisTokenBlacklist {
    pub fn new(redis: SharedConnectionManager, key_mode: KeyMode) -> Self {
        Self {
            redis,
            key_mode,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_command_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

#[async_trait]
impl TokenBlacklist for RedisTokenBlacklist {
    async fn revoke(&self, token: &str, remaining: Duration) -> Result<(), BlacklistError> {
        let Some(ttl_ms) = positive_millis(remaining) else {
            debug!(token = %fingerprint(token), "Token already expired, nothing to blacklist");
            return Ok(());
        };

        let key = blacklist_key(token, self.key_mode);
        let mut conn = self.redis.lock().await.clone();

        with_timeout(self.command_timeout, async {
            redis::cmd("SET")
                .arg(&key)
                .arg(REVOKED_MARKER)
                .arg("PX")
                .arg(ttl_ms)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await?;

        info!(token = %fingerprint(token), ttl_ms, "Token added to blacklist");
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, BlacklistError> {
        let key = blacklist_key(token, self.key_mode);
        let mut conn = self.redis.lock().await.clone();

        let exists: bool = with_timeout(self.command_timeout, async {
            redis::cmd("EXISTS")
                .arg(&key)
                .query_async(&mut conn)
                .await
        })
        .await?;

        Ok(exists)
    }
}
