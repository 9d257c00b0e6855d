//! Request identity extractors
//!
//! `AuthedUser` rejects unauthenticated requests; `MaybeUser` is the
//! optional variant for endpoints that only adjust visibility. Both decode
//! the Bearer token and trust the identity it carries.

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use tracing::debug;

use crate::auth::jwt::JwtService;
use crate::errors::LinkcutError;

/// The authenticated caller's user id.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser(pub i64);

/// The caller's user id when a valid token was presented, otherwise `None`.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<i64>);

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

fn decode_user(req: &HttpRequest) -> Result<i64, LinkcutError> {
    let token =
        bearer_token(req).ok_or_else(|| LinkcutError::unauthorized("Token missing"))?;

    let jwt = req
        .app_data::<web::Data<Arc<JwtService>>>()
        .ok_or_else(|| LinkcutError::unauthorized("Authentication unavailable"))?;

    let claims = jwt.validate_access_token(token).map_err(|e| {
        debug!("Access token validation failed: {}", e);
        LinkcutError::unauthorized("Invalid authentication credentials")
    })?;

    claims
        .sub
        .parse::<i64>()
        .map_err(|_| LinkcutError::unauthorized("Invalid authentication credentials"))
}

impl FromRequest for AuthedUser {
    type Error = LinkcutError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(decode_user(req).map(AuthedUser))
    }
}

impl FromRequest for MaybeUser {
    type Error = LinkcutError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(decode_user(req).ok())))
    }
}
