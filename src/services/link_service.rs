//! Link management service
//!
//! Business logic for creating, updating, deleting and listing links,
//! shared by the HTTP handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::cache::RedirectCache;
use crate::errors::{LinkcutError, Result};
use crate::services::alias::assign_code;
use crate::storage::{Link, LinkStore, NewLink};
use crate::utils::is_valid_alias;
use crate::utils::time_parser::parse_expires_at;
use crate::utils::url_validator::validate_url;

/// Request to create a new link.
#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    pub original_url: String,
    /// Optional custom alias; a code is generated when absent.
    pub custom_alias: Option<String>,
    pub category: Option<String>,
    /// Flexible timestamp (RFC3339 or common naive formats).
    pub expires_at: Option<String>,
}

/// Request to update an existing link. `custom_alias` renames the code.
#[derive(Debug, Clone)]
pub struct UpdateLinkRequest {
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub category: Option<String>,
    pub expires_at: Option<String>,
}

/// Retries for the insert itself when a *generated* code loses the
/// check-then-insert race to a concurrent request. A custom alias never
/// retries; the conflict is surfaced.
const INSERT_RETRY_ATTEMPTS: usize = 3;

pub struct LinkService {
    store: Arc<dyn LinkStore>,
    cache: Arc<dyn RedirectCache>,
}

impl LinkService {
    pub fn new(store: Arc<dyn LinkStore>, cache: Arc<dyn RedirectCache>) -> Self {
        Self { store, cache }
    }

    fn parse_expiry(expires_at: Option<&str>) -> Result<Option<DateTime<Utc>>> {
        match expires_at {
            Some(s) if !s.trim().is_empty() => parse_expires_at(s)
                .map(Some)
                .map_err(LinkcutError::validation),
            _ => Ok(None),
        }
    }

    /// Create a link. `owner_id` is `None` for anonymous creation.
    pub async fn create_link(
        &self,
        req: CreateLinkRequest,
        owner_id: Option<i64>,
        is_public: bool,
    ) -> Result<Link> {
        validate_url(&req.original_url).map_err(|e| LinkcutError::validation(e.to_string()))?;

        let expires_at = Self::parse_expiry(req.expires_at.as_deref())?;
        let mut short_code = assign_code(self.store.as_ref(), req.custom_alias.as_deref()).await?;

        // The unique constraint re-arbitrates the code at insert time. A
        // generated code that loses the race is regenerated; a custom alias
        // conflict is surfaced as-is.
        let mut attempt = 0;
        let link = loop {
            let result = self
                .store
                .insert(NewLink {
                    original_url: req.original_url.clone(),
                    short_code: short_code.clone(),
                    expires_at,
                    owner_id,
                    category: req.category.clone(),
                    is_public,
                })
                .await;

            match result {
                Ok(link) => break link,
                Err(LinkcutError::AliasAlreadyExists(_))
                    if req.custom_alias.is_none() && attempt < INSERT_RETRY_ATTEMPTS =>
                {
                    attempt += 1;
                    short_code = assign_code(self.store.as_ref(), None).await?;
                }
                Err(e) => return Err(e),
            }
        };

        info!("Link created: {} -> {}", link.short_code, link.original_url);
        Ok(link)
    }

    /// Update a link's target, category, expiry and optionally its code.
    /// Only the owner may update.
    pub async fn update_link(
        &self,
        code: &str,
        req: UpdateLinkRequest,
        user_id: i64,
    ) -> Result<Link> {
        validate_url(&req.original_url).map_err(|e| LinkcutError::validation(e.to_string()))?;

        let mut link = self
            .store
            .find_by_code(code)
            .await?
            .ok_or_else(|| LinkcutError::not_found("Link not found"))?;

        if link.owner_id != Some(user_id) {
            return Err(LinkcutError::forbidden(
                "Not authorized to update this link",
            ));
        }

        link.original_url = req.original_url;
        link.expires_at = Self::parse_expiry(req.expires_at.as_deref())?;
        link.category = req.category;

        // Alias rename re-validates format and re-checks uniqueness, the
        // same rules as creation.
        if let Some(alias) = req.custom_alias.as_deref() {
            if !alias.is_empty() && alias != link.short_code {
                if !is_valid_alias(alias) {
                    return Err(LinkcutError::invalid_alias_format(
                        "Custom alias must be alphanumeric",
                    ));
                }
                if self.store.find_by_code(alias).await?.is_some() {
                    return Err(LinkcutError::alias_already_exists(
                        "Custom alias already exists",
                    ));
                }
                link.short_code = alias.to_string();
            }
        }

        self.store.update(&link).await?;

        // Drop the stale entry under the old code; the fresh one fills on
        // the next resolution.
        self.cache.delete(code).await;

        info!("Link updated: {}", link.short_code);
        Ok(link)
    }

    /// Delete a link. Only the owner may delete.
    pub async fn delete_link(&self, code: &str, user_id: i64) -> Result<()> {
        let link = self
            .store
            .find_by_code(code)
            .await?
            .ok_or_else(|| LinkcutError::not_found("Link not found"))?;

        if link.owner_id != Some(user_id) {
            return Err(LinkcutError::forbidden(
                "Not authorized to delete this link",
            ));
        }

        self.store.delete(link.id).await?;
        self.cache.delete(code).await;

        info!("Link deleted: {}", code);
        Ok(())
    }

    /// Full record for a code, counters included.
    pub async fn get_stats(&self, code: &str) -> Result<Link> {
        self.store
            .find_by_code(code)
            .await?
            .ok_or_else(|| LinkcutError::not_found("Link not found"))
    }

    /// Substring search over target URL and code, visibility-filtered.
    pub async fn search(
        &self,
        query: &str,
        viewer: Option<i64>,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Link>> {
        self.store.search(query, viewer, skip, limit).await
    }

    pub async fn list_by_category(&self, category: &str, viewer: Option<i64>) -> Result<Vec<Link>> {
        self.store.list_by_category(category, viewer).await
    }

    pub async fn list_user_links(&self, user_id: i64) -> Result<Vec<Link>> {
        self.store.list_by_owner(user_id).await
    }
}
