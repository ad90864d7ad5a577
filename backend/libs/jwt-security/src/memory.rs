//! In-process token blacklist
//!
//! Same contract as [`RedisTokenBlacklist`](crate::RedisTokenBlacklist), for
//! single-node setups and tests. Entries are evicted lazily on lookup.

use crate::token_blacklist::{blacklist_key, positive_millis, BlacklistError, KeyMode, TokenBlacklist};
use async_trait::async_trait;
use chrono::Duration;
use crypto_core::hash::fingerprint;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Clone, Default)]
pub struct InMemoryTokenBlacklist {
    entries: Arc<DashMap<String, Instant>>,
    key_mode: KeyMode,
}

impl InMemoryTokenBlacklist {
    pub fn new(key_mode: KeyMode) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            key_mode,
        }
    }

    /// Number of stored entries, including ones not yet evicted
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryTokenBlacklist {
    async fn revoke(&self, token: &str, remaining: Duration) -> Result<(), BlacklistError> {
        let Some(ttl_ms) = positive_millis(remaining) else {
            debug!(token = %fingerprint(token), "Token already expired, nothing to blacklist");
            return Ok(());
        };

        let deadline = Instant::now() + std::time::Duration::from_millis(ttl_ms);
        self.entries
            .insert(blacklist_key(token, self.key_mode), deadline);

        info!(token = %fingerprint(token), ttl_ms, "Token added to blacklist");
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, BlacklistError> {
        let key = blacklist_key(token, self.key_mode);
        let now = Instant::now();

        if self.entries.remove_if(&key, |_, deadline| *deadline <= now).is_some() {
            return Ok(false);
        }

        Ok(self.entries.contains_key(&key))
    }
}
