//! Account endpoints: register, token issuance, refresh, own links

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::auth::AuthedUser;
use crate::errors::LinkcutError;
use crate::services::{LinkService, UserService};

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

pub struct UserApi {}

impl UserApi {
    /// `POST /users/register`
    pub async fn register(
        payload: web::Json<UserCreate>,
        service: web::Data<UserService>,
    ) -> Result<HttpResponse, LinkcutError> {
        let user = service.register(&payload.username, &payload.password).await?;

        Ok(HttpResponse::Ok().json(UserOut {
            id: user.id,
            username: user.username,
        }))
    }

    /// `POST /users/token`: password login, form-encoded.
    pub async fn login(
        form: web::Form<LoginForm>,
        service: web::Data<UserService>,
    ) -> Result<HttpResponse, LinkcutError> {
        let tokens = service.login(&form.username, &form.password).await?;

        Ok(HttpResponse::Ok().json(tokens))
    }

    /// `POST /users/token/refresh`
    pub async fn refresh(
        payload: web::Json<RefreshTokenRequest>,
        service: web::Data<UserService>,
    ) -> Result<HttpResponse, LinkcutError> {
        let tokens = service.refresh(&payload.refresh_token).await?;

        Ok(HttpResponse::Ok().json(tokens))
    }

    /// `GET /users/links`: the caller's links, private ones included.
    pub async fn own_links(
        user: AuthedUser,
        service: web::Data<LinkService>,
    ) -> Result<HttpResponse, LinkcutError> {
        let links = service.list_user_links(user.0).await?;

        Ok(HttpResponse::Ok().json(links))
    }
}

pub fn user_routes() -> actix_web::Scope {
    web::scope("/users")
        .route("/register", web::post().to(UserApi::register))
        .route("/token", web::post().to(UserApi::login))
        .route("/token/refresh", web::post().to(UserApi::refresh))
        .route("/links", web::get().to(UserApi::own_links))
}
