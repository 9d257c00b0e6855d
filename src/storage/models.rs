use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short link record. `id` is the surrogate identity, stable for the life
/// of the record; `short_code` is the unique external key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub redirect_count: i64,
    pub last_redirect_at: Option<DateTime<Utc>>,
    pub owner_id: Option<i64>,
    pub category: Option<String>,
    pub is_public: bool,
}

impl Link {
    /// An expired link must never be served.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }
}

/// Fields supplied at link creation; the store assigns `id`, `created_at`
/// and zeroes the counters.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub original_url: String,
    pub short_code: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub owner_id: Option<i64>,
    pub category: Option<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub hashed_password: String,
}
