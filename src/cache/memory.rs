use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use tracing::debug;

use crate::cache::RedirectCache;

/// Payload plus its requested TTL, so each entry expires on its own clock.
#[derive(Clone)]
struct Entry {
    payload: String,
    ttl: Duration,
}

struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache for single-node deployments and tests.
pub struct MemoryCache {
    inner: Cache<String, Entry>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        debug!("MemoryCache initialized with max capacity: {}", max_capacity);
        Self { inner }
    }
}

#[async_trait]
impl RedirectCache for MemoryCache {
    async fn get(&self, code: &str) -> Option<String> {
        self.inner.get(code).await.map(|entry| entry.payload)
    }

    async fn set(&self, code: &str, payload: String, ttl_secs: u64) {
        let entry = Entry {
            payload,
            ttl: Duration::from_secs(ttl_secs),
        };
        self.inner.insert(code.to_string(), entry).await;
    }

    async fn delete(&self, code: &str) {
        self.inner.invalidate(code).await;
    }
}
