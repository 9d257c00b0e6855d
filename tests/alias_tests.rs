//! Code assignment tests
//!
//! Covers custom alias validation, collision handling, and the bounded
//! generate-and-check loop, using an in-memory store double.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use linkcut::errors::{LinkcutError, Result};
use linkcut::services::alias::{MAX_GENERATION_ATTEMPTS, assign_code};
use linkcut::storage::{Link, LinkStore, NewLink};

// =============================================================================
// Store double
// =============================================================================

/// In-memory store keyed by short code. `always_exists` simulates a
/// pathological backend that reports every candidate as taken.
struct MockStore {
    links: RwLock<HashMap<String, Link>>,
    next_id: AtomicUsize,
    always_exists: bool,
    lookups: AtomicUsize,
}

impl MockStore {
    fn new() -> Self {
        Self {
            links: RwLock::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            always_exists: false,
            lookups: AtomicUsize::new(0),
        }
    }

    fn saturated() -> Self {
        Self {
            always_exists: true,
            ..Self::new()
        }
    }

    async fn seed(&self, code: &str) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        let link = Link {
            id,
            original_url: "https://example.com".to_string(),
            short_code: code.to_string(),
            created_at: Utc::now(),
            expires_at: None,
            redirect_count: 0,
            last_redirect_at: None,
            owner_id: None,
            category: None,
            is_public: true,
        };
        self.links.write().await.insert(code.to_string(), link);
    }
}

#[async_trait]
impl LinkStore for MockStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.always_exists {
            return Ok(Some(Link {
                id: 1,
                original_url: "https://example.com".to_string(),
                short_code: code.to_string(),
                created_at: Utc::now(),
                expires_at: None,
                redirect_count: 0,
                last_redirect_at: None,
                owner_id: None,
                category: None,
                is_public: true,
            }));
        }
        Ok(self.links.read().await.get(code).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>> {
        Ok(self
            .links
            .read()
            .await
            .values()
            .find(|link| link.id == id)
            .cloned())
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link> {
        let mut links = self.links.write().await;
        if links.contains_key(&new_link.short_code) {
            return Err(LinkcutError::alias_already_exists(format!(
                "Short code '{}' already exists",
                new_link.short_code
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        let link = Link {
            id,
            original_url: new_link.original_url,
            short_code: new_link.short_code.clone(),
            created_at: Utc::now(),
            expires_at: new_link.expires_at,
            redirect_count: 0,
            last_redirect_at: None,
            owner_id: new_link.owner_id,
            category: new_link.category,
            is_public: new_link.is_public,
        };
        links.insert(new_link.short_code, link.clone());
        Ok(link)
    }

    async fn update(&self, updated: &Link) -> Result<()> {
        self.links
            .write()
            .await
            .insert(updated.short_code.clone(), updated.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut links = self.links.write().await;
        let code = links
            .values()
            .find(|link| link.id == id)
            .map(|link| link.short_code.clone());
        match code {
            Some(code) => {
                links.remove(&code);
                Ok(())
            }
            None => Err(LinkcutError::not_found(format!("Link id {} not found", id))),
        }
    }

    async fn delete_many(&self, ids: &[i64]) -> Result<u64> {
        let mut removed = 0;
        for id in ids {
            if self.delete(*id).await.is_ok() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn query_expired(&self) -> Result<Vec<Link>> {
        let now = Utc::now();
        Ok(self
            .links
            .read()
            .await
            .values()
            .filter(|link| link.is_expired(now))
            .cloned()
            .collect())
    }

    async fn query_inactive(&self, _threshold_days: u64) -> Result<Vec<Link>> {
        Ok(Vec::new())
    }

    async fn list_by_owner(&self, _owner_id: i64) -> Result<Vec<Link>> {
        Ok(Vec::new())
    }

    async fn search(
        &self,
        _query: &str,
        _viewer: Option<i64>,
        _offset: u64,
        _limit: u64,
    ) -> Result<Vec<Link>> {
        Ok(Vec::new())
    }

    async fn list_by_category(&self, _category: &str, _viewer: Option<i64>) -> Result<Vec<Link>> {
        Ok(Vec::new())
    }
}

// =============================================================================
// Custom alias path
// =============================================================================

#[tokio::test]
async fn test_valid_custom_alias_returned_unchanged() {
    let store = MockStore::new();

    for alias in ["myAlias1", "ABC", "123", "xYz9"] {
        let assigned = assign_code(&store, Some(alias)).await.unwrap();
        assert_eq!(assigned, alias);
    }
}

#[tokio::test]
async fn test_custom_alias_rejects_non_alphanumeric() {
    let store = MockStore::new();

    for alias in ["has-dash", "has space", "semi;colon", "", "ünïcode"] {
        let err = assign_code(&store, Some(alias)).await.unwrap_err();
        assert!(
            matches!(err, LinkcutError::InvalidAliasFormat(_)),
            "alias {:?} should be rejected as invalid format, got {:?}",
            alias,
            err
        );
    }
}

#[tokio::test]
async fn test_custom_alias_collision() {
    let store = MockStore::new();
    store.seed("taken1").await;

    let err = assign_code(&store, Some("taken1")).await.unwrap_err();
    assert!(matches!(err, LinkcutError::AliasAlreadyExists(_)));
}

#[tokio::test]
async fn test_custom_alias_is_case_sensitive() {
    let store = MockStore::new();
    store.seed("Alias").await;

    // Different case is a different code
    let assigned = assign_code(&store, Some("alias")).await.unwrap();
    assert_eq!(assigned, "alias");
}

// =============================================================================
// Generated code path
// =============================================================================

#[tokio::test]
async fn test_generated_code_is_unused_and_well_formed() {
    let store = MockStore::new();
    store.seed("abc123").await;

    let code = assign_code(&store, None).await.unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));
    assert!(store.links.read().await.get(&code).is_none());
}

#[tokio::test]
async fn test_generation_retries_on_collision_then_succeeds() {
    let store = MockStore::new();
    // Seeded codes can collide only by astronomical luck; the loop must
    // still terminate quickly with a fresh code.
    for i in 0..50 {
        store.seed(&format!("seed{:02}", i)).await;
    }

    let code = assign_code(&store, None).await.unwrap();
    assert!(!store.links.read().await.contains_key(&code));
}

#[tokio::test]
async fn test_generation_exhausted_against_saturated_store() {
    let store = MockStore::saturated();

    let err = assign_code(&store, None).await.unwrap_err();
    assert!(matches!(err, LinkcutError::GenerationExhausted(_)));
    assert_eq!(store.lookups.load(Ordering::SeqCst), MAX_GENERATION_ATTEMPTS);
}

// =============================================================================
// Constraint arbitration
// =============================================================================

#[tokio::test]
async fn test_insert_is_final_arbiter_for_lost_race() {
    let store = Arc::new(MockStore::new());

    // Both requests saw the alias as free; the second insert loses.
    let assigned = assign_code(store.as_ref(), Some("race01")).await.unwrap();
    store
        .insert(NewLink {
            original_url: "https://example.com/first".to_string(),
            short_code: assigned,
            expires_at: None,
            owner_id: None,
            category: None,
            is_public: true,
        })
        .await
        .unwrap();

    let err = store
        .insert(NewLink {
            original_url: "https://example.com/second".to_string(),
            short_code: "race01".to_string(),
            expires_at: None,
            owner_id: None,
            category: None,
            is_public: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LinkcutError::AliasAlreadyExists(_)));
}
