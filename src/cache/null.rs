use async_trait::async_trait;

use crate::cache::RedirectCache;

/// No-op cache. Every lookup is a miss; resolution runs entirely against the
/// store. Useful when no cache backend is available.
#[derive(Default)]
pub struct NullCache;

#[async_trait]
impl RedirectCache for NullCache {
    async fn get(&self, _code: &str) -> Option<String> {
        None
    }

    async fn set(&self, _code: &str, _payload: String, _ttl_secs: u64) {}

    async fn delete(&self, _code: &str) {}
}
