//! Redirect resolution
//!
//! The core request path: cache lookup, store fallback, expiration
//! enforcement, usage-counter mutation. The cache is advisory; every serve
//! is re-verified against the store record fetched by id, so a stale cache
//! entry can never mask deletion or expiration. That re-fetch costs one
//! store round-trip per cache hit.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, trace};

use crate::cache::{CachedRedirect, RedirectCache};
use crate::errors::{LinkcutError, Result};
use crate::storage::{Link, LinkStore};

/// Resolves short codes to redirect targets. Dependencies are injected;
/// there is no ambient cache or store handle.
#[derive(Clone)]
pub struct RedirectResolver {
    store: Arc<dyn LinkStore>,
    cache: Arc<dyn RedirectCache>,
    cache_ttl: u64,
}

impl RedirectResolver {
    pub fn new(store: Arc<dyn LinkStore>, cache: Arc<dyn RedirectCache>, cache_ttl: u64) -> Self {
        Self {
            store,
            cache,
            cache_ttl,
        }
    }

    /// Resolve a code to its target URL, recording the hit.
    ///
    /// Accessing an expired link is a destructive read: detection deletes
    /// the record and the caller gets `Expired` (410); the next access gets
    /// `NotFound`.
    pub async fn resolve(&self, code: &str) -> Result<String> {
        // A cache error is a miss, and so is a payload that fails to parse.
        let cached = self
            .cache
            .get(code)
            .await
            .and_then(|payload| {
                let parsed = CachedRedirect::parse(&payload);
                if parsed.is_none() {
                    debug!("Malformed cache payload for '{}', treating as miss", code);
                }
                parsed
            });

        let entry = match cached {
            Some(entry) => {
                trace!("Cache hit for code: {}", code);
                entry
            }
            None => {
                let link = self
                    .store
                    .find_by_code(code)
                    .await?
                    .ok_or_else(|| LinkcutError::not_found(format!("Link '{}' not found", code)))?;

                // Checked before the cache fill so an expired link never
                // enters the cache.
                if link.is_expired(Utc::now()) {
                    return Err(self.reclaim_expired(&link).await);
                }

                let entry = CachedRedirect::new(link.id, link.original_url);
                self.cache
                    .set(code, entry.encode(), self.cache_ttl)
                    .await;
                entry
            }
        };

        // Authoritative re-fetch by id before serving.
        let mut link = self
            .store
            .find_by_id(entry.id)
            .await?
            .ok_or_else(|| LinkcutError::not_found(format!("Link '{}' not found", code)))?;

        if link.is_expired(Utc::now()) {
            return Err(self.reclaim_expired(&link).await);
        }

        // Unlocked read-modify-write: concurrent resolutions may lose an
        // increment, which is tolerated for analytics counters.
        link.redirect_count += 1;
        link.last_redirect_at = Some(Utc::now());
        self.store.update(&link).await?;

        info!(
            "Redirected link {}, new count: {}",
            code, link.redirect_count
        );
        Ok(entry.url)
    }

    /// Eagerly reclaim an expired record and produce the terminal error.
    /// A concurrent sweep may have removed the row already; that still
    /// reports `Expired` to this caller.
    async fn reclaim_expired(&self, link: &Link) -> LinkcutError {
        match self.store.delete(link.id).await {
            Ok(()) | Err(LinkcutError::NotFound(_)) => {
                debug!("Expired link reclaimed on access: {}", link.short_code);
            }
            Err(e) => return e,
        }
        LinkcutError::expired(format!("Link '{}' expired", link.short_code))
    }
}
