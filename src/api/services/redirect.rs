//! Redirect endpoint
//!
//! The hot path: `GET /{code}` resolves and answers 307 with the target in
//! `Location`. `NotFound` maps to 404, `Expired` to 410 Gone.

use actix_web::{HttpResponse, web};

use crate::errors::LinkcutError;
use crate::services::RedirectResolver;

pub struct RedirectService {}

impl RedirectService {
    pub async fn handle_redirect(
        path: web::Path<String>,
        resolver: web::Data<RedirectResolver>,
    ) -> Result<HttpResponse, LinkcutError> {
        let code = path.into_inner();
        let target = resolver.resolve(&code).await?;

        Ok(HttpResponse::TemporaryRedirect()
            .insert_header(("Location", target))
            .finish())
    }
}

pub fn redirect_routes() -> actix_web::Scope {
    web::scope("")
        .route("/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/{code}", web::head().to(RedirectService::handle_redirect))
}
