use std::sync::Arc;

use tracing::{error, warn};

pub mod memory;
pub mod null;
pub mod redis;
pub mod traits;

pub use traits::{CachedRedirect, RedirectCache};

pub struct CacheFactory;

impl CacheFactory {
    /// Build the configured cache backend. A cache that fails to initialize
    /// degrades to the null cache rather than failing startup; the cache is
    /// never a hard dependency.
    pub fn create() -> Arc<dyn RedirectCache> {
        let config = crate::config::get_config();

        match config.cache.cache_type.as_str() {
            "redis" => {
                match redis::RedisCache::new(&config.cache.redis.url, &config.cache.redis.key_prefix)
                {
                    Ok(cache) => Arc::new(cache),
                    Err(e) => {
                        error!("Redis cache unavailable, falling back to null cache: {}", e);
                        Arc::new(null::NullCache)
                    }
                }
            }
            "memory" => Arc::new(memory::MemoryCache::new(config.cache.memory.max_capacity)),
            "null" => Arc::new(null::NullCache),
            other => {
                warn!(
                    "Unknown cache type '{}', falling back to null cache. Supported: redis, memory, null",
                    other
                );
                Arc::new(null::NullCache)
            }
        }
    }
}
