//! Account and token issuance service

use std::sync::Arc;

use tracing::info;

use crate::auth::JwtService;
use crate::errors::{LinkcutError, Result};
use crate::storage::{NewUser, User, UserStore};
use crate::utils::password::{hash_password, verify_password};

/// Issued access/refresh token pair.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

pub struct UserService {
    store: Arc<dyn UserStore>,
    jwt: Arc<JwtService>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, jwt: Arc<JwtService>) -> Self {
        Self { store, jwt }
    }

    fn issue_tokens(&self, user_id: i64) -> Result<TokenPair> {
        let access_token = self
            .jwt
            .generate_access_token(user_id)
            .map_err(|e| LinkcutError::unauthorized(format!("Token issuance failed: {}", e)))?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(user_id)
            .map_err(|e| LinkcutError::unauthorized(format!("Token issuance failed: {}", e)))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        })
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(LinkcutError::validation(
                "Username and password must not be empty",
            ));
        }

        // Friendly pre-check; the unique index on username still arbitrates
        // concurrent registration.
        if self.store.find_by_username(username).await?.is_some() {
            return Err(LinkcutError::validation("Username already registered"));
        }

        let hashed_password = hash_password(password)
            .map_err(|e| LinkcutError::password_hash(e.to_string()))?;

        self.store
            .insert_user(NewUser {
                username: username.to_string(),
                hashed_password,
            })
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or_else(|| LinkcutError::unauthorized("Incorrect username or password"))?;

        let valid = verify_password(password, &user.hashed_password)
            .map_err(|e| LinkcutError::password_hash(e.to_string()))?;
        if !valid {
            return Err(LinkcutError::unauthorized("Incorrect username or password"));
        }

        info!("User logged in: {}", user.username);
        self.issue_tokens(user.id)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|_| LinkcutError::unauthorized("Invalid refresh token"))?;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| LinkcutError::unauthorized("Invalid refresh token"))?;

        // The account may have been removed since the token was issued.
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| LinkcutError::unauthorized("User not found"))?;

        info!("Token refreshed for user: {}", user.username);
        self.issue_tokens(user.id)
    }
}
