//! Reclamation sweep tests
//!
//! Expired and inactive sweeps over a real SQLite store: threshold
//! boundaries, idempotence, and zero-match runs.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue};
use tempfile::TempDir;

use linkcut::services::cleanup::{remove_expired_links, remove_inactive_links};
use linkcut::storage::{Link, LinkStore, NewLink, SeaOrmStorage};
use migration::entities::link;

async fn test_storage() -> (TempDir, Arc<SeaOrmStorage>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("cleanup_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");

    (temp_dir, Arc::new(storage))
}

async fn seed_link(storage: &SeaOrmStorage, code: &str) -> Link {
    storage
        .insert(NewLink {
            original_url: "https://example.com".to_string(),
            short_code: code.to_string(),
            expires_at: None,
            owner_id: None,
            category: None,
            is_public: true,
        })
        .await
        .expect("Failed to insert link")
}

async fn set_expiry(storage: &SeaOrmStorage, link: &Link, seconds_ago: i64) {
    let mut updated = link.clone();
    updated.expires_at = Some(Utc::now() - Duration::seconds(seconds_ago));
    storage.update(&updated).await.expect("Failed to update");
}

async fn set_last_redirect(storage: &SeaOrmStorage, link: &Link, days_ago: i64) {
    let mut updated = link.clone();
    updated.last_redirect_at = Some(Utc::now() - Duration::days(days_ago));
    storage.update(&updated).await.expect("Failed to update");
}

/// Insert a never-redirected link with a back-dated creation time, which
/// the normal insert path does not allow.
async fn seed_aged_link(storage: &SeaOrmStorage, code: &str, created_days_ago: i64) -> i64 {
    let model = link::ActiveModel {
        id: ActiveValue::NotSet,
        original_url: ActiveValue::Set("https://example.com".to_string()),
        short_code: ActiveValue::Set(code.to_string()),
        created_at: ActiveValue::Set(Utc::now() - Duration::days(created_days_ago)),
        expires_at: ActiveValue::Set(None),
        redirect_count: ActiveValue::Set(0),
        last_redirect_at: ActiveValue::Set(None),
        owner_id: ActiveValue::Set(None),
        category: ActiveValue::Set(None),
        is_public: ActiveValue::Set(true),
    };
    let inserted = model
        .insert(storage.connection())
        .await
        .expect("Failed to insert aged link");
    inserted.id
}

// =============================================================================
// Expired sweep
// =============================================================================

#[tokio::test]
async fn test_expired_sweep_removes_only_expired() {
    let (_dir, storage) = test_storage().await;

    let expired = seed_link(&storage, "swept1").await;
    set_expiry(&storage, &expired, 1).await;

    let future = seed_link(&storage, "kept01").await;
    let mut future_link = future.clone();
    future_link.expires_at = Some(Utc::now() + Duration::days(1));
    storage.update(&future_link).await.unwrap();

    seed_link(&storage, "kept02").await; // no expiry at all

    let removed = remove_expired_links(storage.as_ref()).await.unwrap();
    assert_eq!(removed, 1);

    assert!(storage.find_by_code("swept1").await.unwrap().is_none());
    assert!(storage.find_by_code("kept01").await.unwrap().is_some());
    assert!(storage.find_by_code("kept02").await.unwrap().is_some());
}

#[tokio::test]
async fn test_expired_sweep_is_idempotent() {
    let (_dir, storage) = test_storage().await;

    let expired = seed_link(&storage, "once01").await;
    set_expiry(&storage, &expired, 1).await;

    assert_eq!(remove_expired_links(storage.as_ref()).await.unwrap(), 1);
    assert_eq!(remove_expired_links(storage.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_expired_sweep_tolerates_empty_store() {
    let (_dir, storage) = test_storage().await;

    assert_eq!(remove_expired_links(storage.as_ref()).await.unwrap(), 0);
}

// =============================================================================
// Inactive sweep
// =============================================================================

#[tokio::test]
async fn test_inactive_sweep_threshold_boundary() {
    let (_dir, storage) = test_storage().await;

    let stale = seed_link(&storage, "stale1").await;
    set_last_redirect(&storage, &stale, 31).await;

    let active = seed_link(&storage, "fresh1").await;
    set_last_redirect(&storage, &active, 29).await;

    let removed = remove_inactive_links(storage.as_ref(), 30).await.unwrap();
    assert_eq!(removed, 1);

    assert!(storage.find_by_code("stale1").await.unwrap().is_none());
    assert!(storage.find_by_code("fresh1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_inactive_sweep_uses_created_at_when_never_redirected() {
    let (_dir, storage) = test_storage().await;

    let old_id = seed_aged_link(&storage, "ghost1", 31).await;
    seed_aged_link(&storage, "young1", 29).await;
    seed_link(&storage, "brand1").await; // just created, never redirected

    let removed = remove_inactive_links(storage.as_ref(), 30).await.unwrap();
    assert_eq!(removed, 1);

    assert!(storage.find_by_id(old_id).await.unwrap().is_none());
    assert!(storage.find_by_code("young1").await.unwrap().is_some());
    assert!(storage.find_by_code("brand1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_inactive_sweep_recent_redirect_overrides_old_creation() {
    let (_dir, storage) = test_storage().await;

    // Created long ago but redirected recently: retained.
    let id = seed_aged_link(&storage, "loved1", 90).await;
    let link = storage.find_by_id(id).await.unwrap().unwrap();
    set_last_redirect(&storage, &link, 5).await;

    let removed = remove_inactive_links(storage.as_ref(), 30).await.unwrap();
    assert_eq!(removed, 0);
    assert!(storage.find_by_id(id).await.unwrap().is_some());
}

// =============================================================================
// Sweeps and live traffic
// =============================================================================

#[tokio::test]
async fn test_sweeps_run_concurrently_with_each_other() {
    let (_dir, storage) = test_storage().await;

    let expired = seed_link(&storage, "both01").await;
    set_expiry(&storage, &expired, 1).await;
    let stale = seed_link(&storage, "both02").await;
    set_last_redirect(&storage, &stale, 40).await;

    let (expired_removed, inactive_removed) = tokio::join!(
        remove_expired_links(storage.as_ref()),
        remove_inactive_links(storage.as_ref(), 30),
    );

    assert_eq!(expired_removed.unwrap(), 1);
    assert_eq!(inactive_removed.unwrap(), 1);
    assert!(storage.find_by_code("both01").await.unwrap().is_none());
    assert!(storage.find_by_code("both02").await.unwrap().is_none());
}
