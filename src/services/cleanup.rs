//! Link reclamation sweeps
//!
//! Two idempotent jobs over the store: expired links and inactive links.
//! Safe to run concurrently with live traffic; each run is one query, one
//! bulk delete, one commit. Deleted entries are not purged from the redirect
//! cache: its TTL bounds the staleness window, and the resolver re-verifies
//! against the store before serving anyway.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::errors::Result;
use crate::storage::LinkStore;

/// Delete every link whose `expires_at` is in the past. Returns the number
/// of rows removed; zero matches is a no-op.
pub async fn remove_expired_links(store: &dyn LinkStore) -> Result<u64> {
    let expired = store.query_expired().await?;
    if expired.is_empty() {
        debug!("Cleanup: no expired links");
        return Ok(0);
    }

    let ids: Vec<i64> = expired.iter().map(|link| link.id).collect();
    let removed = store.delete_many(&ids).await?;

    info!("Cleanup: {} expired links removed", removed);
    Ok(removed)
}

/// Delete every link not redirected within the threshold window; links that
/// were never redirected are measured from `created_at` instead.
pub async fn remove_inactive_links(store: &dyn LinkStore, threshold_days: u64) -> Result<u64> {
    let inactive = store.query_inactive(threshold_days).await?;
    if inactive.is_empty() {
        debug!("Inactive cleanup: no inactive links");
        return Ok(0);
    }

    let ids: Vec<i64> = inactive.iter().map(|link| link.id).collect();
    let removed = store.delete_many(&ids).await?;

    info!("Inactive cleanup: {} inactive links removed", removed);
    Ok(removed)
}

/// Drive both sweeps on a fixed interval. The sweep functions carry no
/// scheduler state; any external trigger could call them instead.
pub fn spawn_sweeper(store: Arc<dyn LinkStore>, threshold_days: u64, interval: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            if let Err(e) = remove_expired_links(store.as_ref()).await {
                error!("Expired-link sweep failed: {}", e);
            }
            if let Err(e) = remove_inactive_links(store.as_ref(), threshold_days).await {
                error!("Inactive-link sweep failed: {}", e);
            }
        }
    });

    info!(
        "Reclamation sweeper started (interval: {}s, inactive threshold: {} days)",
        interval.as_secs(),
        threshold_days
    );
}
