//! Redirect resolution tests
//!
//! The critical path: short code → 307 redirect, with expiration enforced
//! as a destructive read and the cache re-verified against the store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tempfile::TempDir;
use tokio::sync::RwLock;

use linkcut::api::redirect_routes;
use linkcut::cache::{CachedRedirect, RedirectCache};
use linkcut::errors::LinkcutError;
use linkcut::services::RedirectResolver;
use linkcut::storage::{Link, LinkStore, NewLink, SeaOrmStorage};

// =============================================================================
// Test setup
// =============================================================================

async fn test_storage() -> (TempDir, Arc<SeaOrmStorage>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("redirect_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");

    (temp_dir, Arc::new(storage))
}

async fn seed_link(storage: &SeaOrmStorage, code: &str, url: &str) -> Link {
    storage
        .insert(NewLink {
            original_url: url.to_string(),
            short_code: code.to_string(),
            expires_at: None,
            owner_id: None,
            category: None,
            is_public: true,
        })
        .await
        .expect("Failed to insert link")
}

async fn seed_expired_link(storage: &SeaOrmStorage, code: &str) -> Link {
    let mut link = seed_link(storage, code, "https://example.com/expired").await;
    link.expires_at = Some(Utc::now() - Duration::seconds(1));
    storage.update(&link).await.expect("Failed to update link");
    link
}

/// Recording cache: a plain map plus set/delete counters.
struct MockCache {
    data: RwLock<HashMap<String, String>>,
    sets: AtomicUsize,
}

impl MockCache {
    fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            sets: AtomicUsize::new(0),
        }
    }

    async fn put_raw(&self, code: &str, payload: &str) {
        self.data
            .write()
            .await
            .insert(code.to_string(), payload.to_string());
    }
}

#[async_trait]
impl RedirectCache for MockCache {
    async fn get(&self, code: &str) -> Option<String> {
        self.data.read().await.get(code).cloned()
    }

    async fn set(&self, code: &str, payload: String, _ttl_secs: u64) {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.data.write().await.insert(code.to_string(), payload);
    }

    async fn delete(&self, code: &str) {
        self.data.write().await.remove(code);
    }
}

fn make_resolver(storage: Arc<SeaOrmStorage>, cache: Arc<MockCache>) -> RedirectResolver {
    RedirectResolver::new(storage, cache, 60)
}

// =============================================================================
// Resolution semantics
// =============================================================================

#[tokio::test]
async fn test_resolve_increments_counter_and_timestamps() {
    let (_dir, storage) = test_storage().await;
    let cache = Arc::new(MockCache::new());
    let link = seed_link(&storage, "abc123", "https://example.com/target").await;
    assert_eq!(link.redirect_count, 0);
    assert!(link.last_redirect_at.is_none());

    let resolver = make_resolver(storage.clone(), cache.clone());

    let url = resolver.resolve("abc123").await.unwrap();
    assert_eq!(url, "https://example.com/target");

    let after_first = storage.find_by_id(link.id).await.unwrap().unwrap();
    assert_eq!(after_first.redirect_count, 1);
    let first_at = after_first.last_redirect_at.expect("timestamp set");

    let url = resolver.resolve("abc123").await.unwrap();
    assert_eq!(url, "https://example.com/target");

    let after_second = storage.find_by_id(link.id).await.unwrap().unwrap();
    assert_eq!(after_second.redirect_count, 2);
    assert!(after_second.last_redirect_at.expect("timestamp set") >= first_at);
}

#[tokio::test]
async fn test_resolve_unknown_code_not_found_without_mutation() {
    let (_dir, storage) = test_storage().await;
    let cache = Arc::new(MockCache::new());
    seed_link(&storage, "known1", "https://example.com").await;

    let resolver = make_resolver(storage.clone(), cache.clone());

    let err = resolver.resolve("missing").await.unwrap_err();
    assert!(matches!(err, LinkcutError::NotFound(_)));

    // No state was touched: the known link is unchanged, nothing cached.
    let link = storage.find_by_code("known1").await.unwrap().unwrap();
    assert_eq!(link.redirect_count, 0);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expired_resolution_is_a_destructive_read() {
    let (_dir, storage) = test_storage().await;
    let cache = Arc::new(MockCache::new());
    seed_expired_link(&storage, "expired1").await;

    let resolver = make_resolver(storage.clone(), cache.clone());

    // First access detects expiry, deletes the record, reports Gone.
    let err = resolver.resolve("expired1").await.unwrap_err();
    assert!(matches!(err, LinkcutError::Expired(_)));
    assert!(storage.find_by_code("expired1").await.unwrap().is_none());

    // The record is gone, so the second access is a plain 404.
    let err = resolver.resolve("expired1").await.unwrap_err();
    assert!(matches!(err, LinkcutError::NotFound(_)));
}

#[tokio::test]
async fn test_expired_link_never_enters_cache() {
    let (_dir, storage) = test_storage().await;
    let cache = Arc::new(MockCache::new());
    seed_expired_link(&storage, "expired2").await;

    let resolver = make_resolver(storage.clone(), cache.clone());
    let _ = resolver.resolve("expired2").await;

    assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
    assert!(cache.data.read().await.is_empty());
}

#[tokio::test]
async fn test_fresh_resolution_populates_cache() {
    let (_dir, storage) = test_storage().await;
    let cache = Arc::new(MockCache::new());
    let link = seed_link(&storage, "fill01", "https://example.com/fill").await;

    let resolver = make_resolver(storage.clone(), cache.clone());
    resolver.resolve("fill01").await.unwrap();

    assert_eq!(cache.sets.load(Ordering::SeqCst), 1);
    let payload = cache.get("fill01").await.expect("cache populated");
    let entry = CachedRedirect::parse(&payload).expect("payload parses");
    assert_eq!(entry.id, link.id);
    assert_eq!(entry.url, "https://example.com/fill");

    // A cache hit does not re-populate.
    resolver.resolve("fill01").await.unwrap();
    assert_eq!(cache.sets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cached_url_served_while_record_reverified_by_id() {
    let (_dir, storage) = test_storage().await;
    let cache = Arc::new(MockCache::new());
    let link = seed_link(&storage, "pin001", "https://example.com/v1").await;

    let resolver = make_resolver(storage.clone(), cache.clone());
    resolver.resolve("pin001").await.unwrap();

    // Mutate the stored target behind the cache's back.
    let mut current = storage.find_by_id(link.id).await.unwrap().unwrap();
    current.original_url = "https://example.com/v2".to_string();
    storage.update(&current).await.unwrap();

    // Within the TTL the cached target is served, but the id-based
    // re-verification still runs: the counter advances.
    let url = resolver.resolve("pin001").await.unwrap();
    assert_eq!(url, "https://example.com/v1");
    let after = storage.find_by_id(link.id).await.unwrap().unwrap();
    assert_eq!(after.redirect_count, 2);
}

#[tokio::test]
async fn test_stale_cache_entry_for_deleted_record_is_not_served() {
    let (_dir, storage) = test_storage().await;
    let cache = Arc::new(MockCache::new());
    let link = seed_link(&storage, "gone01", "https://example.com/gone").await;

    // Entry points at a record that no longer exists.
    cache
        .put_raw(
            "gone01",
            &CachedRedirect::new(link.id, "https://example.com/gone").encode(),
        )
        .await;
    storage.delete(link.id).await.unwrap();

    let resolver = make_resolver(storage.clone(), cache.clone());
    let err = resolver.resolve("gone01").await.unwrap_err();
    assert!(matches!(err, LinkcutError::NotFound(_)));
}

#[tokio::test]
async fn test_stale_cache_entry_for_expired_record_is_reclaimed() {
    let (_dir, storage) = test_storage().await;
    let cache = Arc::new(MockCache::new());
    let link = seed_link(&storage, "late01", "https://example.com/late").await;

    // Cached while fresh, then the record expires.
    cache
        .put_raw(
            "late01",
            &CachedRedirect::new(link.id, "https://example.com/late").encode(),
        )
        .await;
    let mut current = storage.find_by_id(link.id).await.unwrap().unwrap();
    current.expires_at = Some(Utc::now() - Duration::seconds(1));
    storage.update(&current).await.unwrap();

    let resolver = make_resolver(storage.clone(), cache.clone());
    let err = resolver.resolve("late01").await.unwrap_err();
    assert!(matches!(err, LinkcutError::Expired(_)));
    assert!(storage.find_by_id(link.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_malformed_cache_payload_falls_back_to_store() {
    let (_dir, storage) = test_storage().await;
    let cache = Arc::new(MockCache::new());
    seed_link(&storage, "junk01", "https://example.com/real").await;

    cache.put_raw("junk01", "definitely-not-a-payload").await;

    let resolver = make_resolver(storage.clone(), cache.clone());
    let url = resolver.resolve("junk01").await.unwrap();
    assert_eq!(url, "https://example.com/real");

    // The fallback repopulated the cache with a well-formed payload.
    let payload = cache.get("junk01").await.unwrap();
    assert!(CachedRedirect::parse(&payload).is_some());
}

// =============================================================================
// HTTP mapping
// =============================================================================

#[tokio::test]
async fn test_http_redirect_status_codes() {
    let (_dir, storage) = test_storage().await;
    let cache = Arc::new(MockCache::new());
    seed_link(&storage, "live01", "https://example.com/live").await;
    seed_expired_link(&storage, "dead01").await;

    let resolver_data = web::Data::new(make_resolver(storage.clone(), cache.clone()));
    let app = test::init_service(
        App::new()
            .app_data(resolver_data)
            .service(redirect_routes()),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/live01").to_request()).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(location, "https://example.com/live");

    let resp = test::call_service(&app, TestRequest::get().uri("/nosuch").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Expired access deletes and answers Gone; the retry is a 404.
    let resp = test::call_service(&app, TestRequest::get().uri("/dead01").to_request()).await;
    assert_eq!(resp.status(), StatusCode::GONE);
    let resp = test::call_service(&app, TestRequest::get().uri("/dead01").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
