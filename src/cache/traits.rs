use async_trait::async_trait;

/// Best-effort TTL cache in front of the link store. Implementations must
/// swallow every backend failure: a cache error is indistinguishable from a
/// miss, and resolution never depends on the cache being reachable.
#[async_trait]
pub trait RedirectCache: Send + Sync {
    /// Raw payload for a code, or `None` on miss/error.
    async fn get(&self, code: &str) -> Option<String>;

    /// Store a payload with a per-entry TTL, best-effort.
    async fn set(&self, code: &str, payload: String, ttl_secs: u64);

    /// Drop an entry, best-effort.
    async fn delete(&self, code: &str);
}

/// The cached redirect value, wire format `"{id}|{original_url}"`.
///
/// The id is carried so the resolver can re-fetch the authoritative record;
/// the store remains the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedRedirect {
    pub id: i64,
    pub url: String,
}

impl CachedRedirect {
    pub fn new(id: i64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}|{}", self.id, self.url)
    }

    /// Parse a cache payload. A malformed payload yields `None`; callers
    /// treat that as a miss and fall back to the store.
    pub fn parse(payload: &str) -> Option<Self> {
        let (id_str, url) = payload.split_once('|')?;
        let id = id_str.parse::<i64>().ok()?;
        if url.is_empty() {
            return None;
        }
        Some(Self {
            id,
            url: url.to_string(),
        })
    }
}
