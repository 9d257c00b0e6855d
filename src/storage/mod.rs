use std::sync::Arc;

use tracing::error;

use crate::errors::{LinkcutError, Result};

pub mod backends;
pub mod models;

pub use backends::sea_orm::SeaOrmStorage;
pub use models::{Link, NewLink, NewUser, User};

/// Durable store of links. The relational backend is the source of truth;
/// the redirect cache in front of it is advisory only.
#[async_trait::async_trait]
pub trait LinkStore: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>>;

    /// Insert a new link. The unique constraint on `short_code` is the final
    /// arbiter of the check-then-insert race: losing it yields
    /// `AliasAlreadyExists`.
    async fn insert(&self, link: NewLink) -> Result<Link>;
    async fn update(&self, link: &Link) -> Result<()>;
    async fn delete(&self, id: i64) -> Result<()>;

    /// Bulk delete within a single transaction. Returns rows removed.
    async fn delete_many(&self, ids: &[i64]) -> Result<u64>;

    /// Links with `expires_at` in the past.
    async fn query_expired(&self) -> Result<Vec<Link>>;

    /// Links not redirected (or, if never redirected, not created) within
    /// the threshold window.
    async fn query_inactive(&self, threshold_days: u64) -> Result<Vec<Link>>;

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>>;

    /// Substring search over `original_url` and `short_code`. Non-owners
    /// only see public links; `viewer` additionally sees their own.
    async fn search(
        &self,
        query: &str,
        viewer: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Link>>;

    async fn list_by_category(&self, category: &str, viewer: Option<i64>) -> Result<Vec<Link>>;
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn insert_user(&self, user: NewUser) -> Result<User>;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let backend = &config.database.backend;
        let database_url = &config.database.database_url;

        match backend.as_str() {
            "sqlite" | "mysql" | "postgres" | "mariadb" => {
                let storage = SeaOrmStorage::new(database_url, backend).await?;
                Ok(Arc::new(storage))
            }
            _ => {
                error!("Unknown storage backend: {}", backend);
                Err(LinkcutError::database_connection(format!(
                    "Unknown storage backend: {}. Supported: sqlite, mysql, postgres, mariadb",
                    backend
                )))
            }
        }
    }
}
