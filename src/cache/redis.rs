use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, error, trace};

use crate::cache::RedirectCache;

/// Cache operations must degrade to the store path quickly; a slow cache is
/// treated the same as a dead one.
const CACHE_OP_TIMEOUT: Duration = Duration::from_millis(100);

pub struct RedisCache {
    client: redis::Client,
    /// Persistent connection, lazily established and reset on error.
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisCache {
    pub fn new(url: &str, key_prefix: &str) -> Result<Self, String> {
        debug!("RedisCache created with prefix: '{}'", key_prefix);

        let client =
            redis::Client::open(url).map_err(|e| format!("Failed to create Redis client: {e}"))?;

        // Connectivity smoke test; a dead cache at startup is worth knowing
        // about even though resolution tolerates it.
        match client.get_connection() {
            Ok(mut conn) => match redis::cmd("PING").query::<String>(&mut conn) {
                Ok(response) => {
                    debug!("Redis connection test successful: {}", response);
                }
                Err(e) => {
                    error!("Failed to ping Redis server: {}. URL: {}", e, url);
                    return Err(format!("Redis ping failed: {e}"));
                }
            },
            Err(e) => {
                error!("Failed to ping Redis server: {}. URL: {}", e, url);
                return Err(format!("Redis ping failed: {e}"));
            }
        }

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: key_prefix.to_string(),
        })
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection, redis::RedisError> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // Double check under the write lock
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    fn make_key(&self, code: &str) -> String {
        format!("{}{}", self.key_prefix, code)
    }
}

#[async_trait]
impl RedirectCache for RedisCache {
    async fn get(&self, code: &str) -> Option<String> {
        let redis_key = self.make_key(code);

        let mut conn = match tokio::time::timeout(CACHE_OP_TIMEOUT, self.get_connection()).await {
            Ok(Ok(c)) => c,
            Ok(Err(e)) => {
                error!("Failed to get Redis connection: {}", e);
                self.reset_connection().await;
                return None;
            }
            Err(_) => {
                error!("Redis connection attempt timed out");
                return None;
            }
        };

        let result: Result<redis::RedisResult<Option<String>>, _> =
            tokio::time::timeout(CACHE_OP_TIMEOUT, conn.get(&redis_key)).await;

        match result {
            Ok(Ok(Some(payload))) => {
                trace!("Cache hit for code: {}", code);
                Some(payload)
            }
            Ok(Ok(None)) => {
                trace!("Cache miss for code: {}", code);
                None
            }
            Ok(Err(e)) => {
                error!("Failed to get key '{}': {}", code, e);
                self.reset_connection().await;
                None
            }
            Err(_) => {
                error!("Redis GET timed out for key '{}'", code);
                None
            }
        }
    }

    async fn set(&self, code: &str, payload: String, ttl_secs: u64) {
        let redis_key = self.make_key(code);

        let mut conn = match tokio::time::timeout(CACHE_OP_TIMEOUT, self.get_connection()).await {
            Ok(Ok(c)) => c,
            Ok(Err(e)) => {
                error!("Failed to get Redis connection: {}", e);
                self.reset_connection().await;
                return;
            }
            Err(_) => {
                error!("Redis connection attempt timed out");
                return;
            }
        };

        match tokio::time::timeout(
            CACHE_OP_TIMEOUT,
            conn.set_ex::<String, String, ()>(redis_key, payload, ttl_secs),
        )
        .await
        {
            Ok(Ok(())) => {
                trace!("Cached code: {}", code);
            }
            Ok(Err(e)) => {
                error!("Failed to cache key '{}': {}", code, e);
                self.reset_connection().await;
            }
            Err(_) => {
                error!("Redis SETEX timed out for key '{}'", code);
            }
        }
    }

    async fn delete(&self, code: &str) {
        let redis_key = self.make_key(code);

        let mut conn = match tokio::time::timeout(CACHE_OP_TIMEOUT, self.get_connection()).await {
            Ok(Ok(c)) => c,
            Ok(Err(e)) => {
                error!("Failed to get Redis connection: {}", e);
                self.reset_connection().await;
                return;
            }
            Err(_) => {
                error!("Redis connection attempt timed out");
                return;
            }
        };

        match tokio::time::timeout(CACHE_OP_TIMEOUT, conn.del::<String, i64>(redis_key)).await {
            Ok(Ok(deleted)) => {
                if deleted > 0 {
                    trace!("Removed cached code: {}", code);
                }
            }
            Ok(Err(e)) => {
                error!("Failed to remove key '{}': {}", code, e);
                self.reset_connection().await;
            }
            Err(_) => {
                error!("Redis DEL timed out for key '{}'", code);
            }
        }
    }
}
