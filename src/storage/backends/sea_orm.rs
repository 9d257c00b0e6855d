use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectOptions, Database,
    DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use tracing::{info, warn};

use crate::errors::{LinkcutError, Result};
use crate::storage::models::{Link, NewLink, NewUser, User};
use crate::storage::{LinkStore, UserStore};

use migration::{Migrator, MigratorTrait, entities::link, entities::user};

#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(LinkcutError::database_connection(
                "DATABASE_URL is not set".to_string(),
            ));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
        };

        run_migrations(&storage.db).await?;

        warn!(
            "{} storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn model_to_link(model: link::Model) -> Link {
        Link {
            id: model.id,
            original_url: model.original_url,
            short_code: model.short_code,
            created_at: model.created_at,
            expires_at: model.expires_at,
            redirect_count: model.redirect_count,
            last_redirect_at: model.last_redirect_at,
            owner_id: model.owner_id,
            category: model.category,
            is_public: model.is_public,
        }
    }

    fn model_to_user(model: user::Model) -> User {
        User {
            id: model.id,
            username: model.username,
            hashed_password: model.hashed_password,
            created_at: model.created_at,
        }
    }

    /// Visibility condition: public links for everyone, plus the viewer's
    /// own links when authenticated.
    fn visibility_condition(viewer: Option<i64>) -> Condition {
        match viewer {
            Some(user_id) => Condition::any()
                .add(link::Column::IsPublic.eq(true))
                .add(link::Column::OwnerId.eq(user_id)),
            None => Condition::any().add(link::Column::IsPublic.eq(true)),
        }
    }
}

/// Connect to SQLite with auto-create and the usual performance pragmas.
pub async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::SqlitePool;
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
    use std::str::FromStr;

    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| LinkcutError::database_connection(format!("SQLite URL parse failed: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(5))
        .pragma("cache_size", "-64000")
        .pragma("temp_store", "memory");

    let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
        LinkcutError::database_connection(format!("Failed to connect to SQLite: {}", e))
    })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// Connect to MySQL/PostgreSQL with pool settings from configuration.
async fn connect_generic(database_url: &str, backend_name: &str) -> Result<DatabaseConnection> {
    let config = crate::config::get_config();

    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(config.database.pool_size)
        .min_connections(1)
        .connect_timeout(std::time::Duration::from_secs(config.database.timeout))
        .acquire_timeout(std::time::Duration::from_secs(config.database.timeout))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        LinkcutError::database_connection(format!(
            "Failed to connect to {} database: {}",
            backend_name.to_uppercase(),
            e
        ))
    })
}

pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| LinkcutError::database_operation(format!("Migration failed: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}

/// Unique-constraint violation detection across backends.
/// SQLite: SQLITE_CONSTRAINT (2067), MySQL: ER_DUP_ENTRY (1062),
/// PostgreSQL: unique_violation (23505).
fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    use sea_orm::sqlx::Error;

    let sqlx_err = match err {
        sea_orm::DbErr::Exec(sea_orm::RuntimeErr::SqlxError(e))
        | sea_orm::DbErr::Query(sea_orm::RuntimeErr::SqlxError(e)) => e,
        _ => return false,
    };

    match &**sqlx_err {
        Error::Database(db_err) => db_err
            .code()
            .as_ref()
            .map(|c| c == "2067" || c == "1062" || c == "23505")
            .unwrap_or(false),
        _ => false,
    }
}

#[async_trait]
impl LinkStore for SeaOrmStorage {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>> {
        let model = link::Entity::find()
            .filter(link::Column::ShortCode.eq(code))
            .one(&self.db)
            .await?;

        Ok(model.map(Self::model_to_link))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>> {
        let model = link::Entity::find_by_id(id).one(&self.db).await?;

        Ok(model.map(Self::model_to_link))
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link> {
        let active = link::ActiveModel {
            id: ActiveValue::NotSet,
            original_url: ActiveValue::Set(new_link.original_url),
            short_code: ActiveValue::Set(new_link.short_code.clone()),
            created_at: ActiveValue::Set(Utc::now()),
            expires_at: ActiveValue::Set(new_link.expires_at),
            redirect_count: ActiveValue::Set(0),
            last_redirect_at: ActiveValue::Set(None),
            owner_id: ActiveValue::Set(new_link.owner_id),
            category: ActiveValue::Set(new_link.category),
            is_public: ActiveValue::Set(new_link.is_public),
        };

        match active.insert(&self.db).await {
            Ok(model) => {
                info!("Short link created: {}", model.short_code);
                Ok(Self::model_to_link(model))
            }
            Err(e) if is_unique_violation(&e) => Err(LinkcutError::alias_already_exists(format!(
                "Short code '{}' already exists",
                new_link.short_code
            ))),
            Err(e) => Err(LinkcutError::database_operation(format!(
                "Failed to insert link: {}",
                e
            ))),
        }
    }

    async fn update(&self, updated: &Link) -> Result<()> {
        let active = link::ActiveModel {
            id: ActiveValue::Unchanged(updated.id),
            original_url: ActiveValue::Set(updated.original_url.clone()),
            short_code: ActiveValue::Set(updated.short_code.clone()),
            created_at: ActiveValue::Unchanged(updated.created_at),
            expires_at: ActiveValue::Set(updated.expires_at),
            redirect_count: ActiveValue::Set(updated.redirect_count),
            last_redirect_at: ActiveValue::Set(updated.last_redirect_at),
            owner_id: ActiveValue::Set(updated.owner_id),
            category: ActiveValue::Set(updated.category.clone()),
            is_public: ActiveValue::Set(updated.is_public),
        };

        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(LinkcutError::alias_already_exists(format!(
                "Short code '{}' already exists",
                updated.short_code
            ))),
            Err(e) => Err(LinkcutError::database_operation(format!(
                "Failed to update link: {}",
                e
            ))),
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = link::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LinkcutError::database_operation(format!("Failed to delete link: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(LinkcutError::not_found(format!("Link id {} not found", id)));
        }

        Ok(())
    }

    async fn delete_many(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;

        let deleted = link::Entity::delete_many()
            .filter(link::Column::Id.is_in(ids.iter().copied()))
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;

        Ok(deleted)
    }

    async fn query_expired(&self) -> Result<Vec<Link>> {
        let now = Utc::now();

        let models = link::Entity::find()
            .filter(link::Column::ExpiresAt.is_not_null())
            .filter(link::Column::ExpiresAt.lt(now))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_link).collect())
    }

    async fn query_inactive(&self, threshold_days: u64) -> Result<Vec<Link>> {
        let cutoff = Utc::now() - Duration::days(threshold_days as i64);

        let condition = Condition::any()
            .add(
                Condition::all()
                    .add(link::Column::LastRedirectAt.is_not_null())
                    .add(link::Column::LastRedirectAt.lt(cutoff)),
            )
            .add(
                Condition::all()
                    .add(link::Column::LastRedirectAt.is_null())
                    .add(link::Column::CreatedAt.lt(cutoff)),
            );

        let models = link::Entity::find()
            .filter(condition)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_link).collect())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>> {
        let models = link::Entity::find()
            .filter(link::Column::OwnerId.eq(owner_id))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_link).collect())
    }

    async fn search(
        &self,
        query: &str,
        viewer: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Link>> {
        let matches = Condition::any()
            .add(link::Column::OriginalUrl.contains(query))
            .add(link::Column::ShortCode.contains(query));

        let models = link::Entity::find()
            .filter(Self::visibility_condition(viewer))
            .filter(matches)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_link).collect())
    }

    async fn list_by_category(&self, category: &str, viewer: Option<i64>) -> Result<Vec<Link>> {
        let models = link::Entity::find()
            .filter(Self::visibility_condition(viewer))
            .filter(link::Column::Category.eq(category))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_link).collect())
    }
}

#[async_trait]
impl UserStore for SeaOrmStorage {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(model.map(Self::model_to_user))
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;

        Ok(model.map(Self::model_to_user))
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<User> {
        let active = user::ActiveModel {
            id: ActiveValue::NotSet,
            username: ActiveValue::Set(new_user.username.clone()),
            hashed_password: ActiveValue::Set(new_user.hashed_password),
            created_at: ActiveValue::Set(Utc::now()),
        };

        match active.insert(&self.db).await {
            Ok(model) => {
                info!("User registered: {}", model.username);
                Ok(Self::model_to_user(model))
            }
            Err(e) if is_unique_violation(&e) => Err(LinkcutError::validation(
                "Username already registered".to_string(),
            )),
            Err(e) => Err(LinkcutError::database_operation(format!(
                "Failed to insert user: {}",
                e
            ))),
        }
    }
}
