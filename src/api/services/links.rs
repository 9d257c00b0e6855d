//! Link management endpoints

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::{AuthedUser, MaybeUser};
use crate::errors::LinkcutError;
use crate::services::LinkService;
use crate::services::link_service::{CreateLinkRequest, UpdateLinkRequest};

#[derive(Debug, Deserialize)]
pub struct LinkPayload {
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub category: Option<String>,
    pub expires_at: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_search_limit")]
    pub limit: u64,
}

fn default_search_limit() -> u64 {
    10
}

pub struct LinkApi {}

impl LinkApi {
    /// `POST /shorten`: create a link owned by the caller.
    pub async fn create_link(
        payload: web::Json<LinkPayload>,
        user: AuthedUser,
        service: web::Data<LinkService>,
    ) -> Result<HttpResponse, LinkcutError> {
        let payload = payload.into_inner();
        let is_public = payload.is_public.unwrap_or(false);

        let link = service
            .create_link(
                CreateLinkRequest {
                    original_url: payload.original_url,
                    custom_alias: payload.custom_alias,
                    category: payload.category,
                    expires_at: payload.expires_at,
                },
                Some(user.0),
                is_public,
            )
            .await?;

        Ok(HttpResponse::Ok().json(link))
    }

    /// `POST /shorten/public`: anonymous creation; the link has no owner
    /// and is always public.
    pub async fn create_link_public(
        payload: web::Json<LinkPayload>,
        service: web::Data<LinkService>,
    ) -> Result<HttpResponse, LinkcutError> {
        let payload = payload.into_inner();

        let link = service
            .create_link(
                CreateLinkRequest {
                    original_url: payload.original_url,
                    custom_alias: payload.custom_alias,
                    category: payload.category,
                    expires_at: payload.expires_at,
                },
                None,
                true,
            )
            .await?;

        Ok(HttpResponse::Ok().json(link))
    }

    /// `GET /search?query=`: public links, plus the caller's own.
    pub async fn search_links(
        params: web::Query<SearchParams>,
        viewer: MaybeUser,
        service: web::Data<LinkService>,
    ) -> Result<HttpResponse, LinkcutError> {
        let limit = params.limit.clamp(1, 100);
        let links = service
            .search(&params.query, viewer.0, params.skip, limit)
            .await?;

        Ok(HttpResponse::Ok().json(links))
    }

    /// `GET /category/{category}`
    pub async fn links_by_category(
        path: web::Path<String>,
        viewer: MaybeUser,
        service: web::Data<LinkService>,
    ) -> Result<HttpResponse, LinkcutError> {
        let links = service.list_by_category(&path.into_inner(), viewer.0).await?;

        Ok(HttpResponse::Ok().json(links))
    }

    /// `GET /{code}/stats`: full record including redirect counters.
    pub async fn get_stats(
        path: web::Path<String>,
        service: web::Data<LinkService>,
    ) -> Result<HttpResponse, LinkcutError> {
        let link = service.get_stats(&path.into_inner()).await?;

        Ok(HttpResponse::Ok().json(link))
    }

    /// `PUT /{code}`: owner-only update, including alias rename.
    pub async fn update_link(
        path: web::Path<String>,
        payload: web::Json<LinkPayload>,
        user: AuthedUser,
        service: web::Data<LinkService>,
    ) -> Result<HttpResponse, LinkcutError> {
        let payload = payload.into_inner();

        let link = service
            .update_link(
                &path.into_inner(),
                UpdateLinkRequest {
                    original_url: payload.original_url,
                    custom_alias: payload.custom_alias,
                    category: payload.category,
                    expires_at: payload.expires_at,
                },
                user.0,
            )
            .await?;

        Ok(HttpResponse::Ok().json(link))
    }

    /// `DELETE /{code}`: owner-only delete.
    pub async fn delete_link(
        path: web::Path<String>,
        user: AuthedUser,
        service: web::Data<LinkService>,
    ) -> Result<HttpResponse, LinkcutError> {
        service.delete_link(&path.into_inner(), user.0).await?;

        Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Link deleted" })))
    }
}

pub fn link_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/shorten", web::post().to(LinkApi::create_link))
        .route("/shorten/public", web::post().to(LinkApi::create_link_public))
        .route("/search", web::get().to(LinkApi::search_links))
        .route("/category/{category}", web::get().to(LinkApi::links_by_category))
        .route("/{code}/stats", web::get().to(LinkApi::get_stats))
        .route("/{code}", web::put().to(LinkApi::update_link))
        .route("/{code}", web::delete().to(LinkApi::delete_link));
}
