//! Test utilities for Redis-backed blacklist tests
//!
//! Tests should handle connection failures gracefully

use redis::aio::ConnectionManager;
use redis::Client;
use redis_utils::SharedConnectionManager;
use std::env;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Get Redis connection for testing
///
/// Uses REDIS_TEST_URL environment variable or defaults to localhost
pub async fn get_test_redis_connection() -> Option<SharedConnectionManager> {
    let redis_url =
        env::var("REDIS_TEST_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

    let client = Client::open(redis_url).ok()?;
    let manager = ConnectionManager::new(client).await.ok()?;

    Some(Arc::new(Mutex::new(manager)))
}
