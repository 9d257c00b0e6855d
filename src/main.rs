use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use tracing::info;

use linkcut::api::{link_routes, redirect_routes, user_routes};
use linkcut::auth::JwtService;
use linkcut::cache::CacheFactory;
use linkcut::logging::init_logging;
use linkcut::services::cleanup::spawn_sweeper;
use linkcut::services::{LinkService, RedirectResolver, UserService};
use linkcut::storage::{LinkStore, StorageFactory, UserStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = linkcut::config::init_config();
    let _log_guard = init_logging(config);

    let storage = StorageFactory::create()
        .await
        .expect("Failed to create storage");
    let store: Arc<dyn LinkStore> = storage.clone();

    let cache = CacheFactory::create();
    let jwt = Arc::new(JwtService::from_config());

    let resolver = web::Data::new(RedirectResolver::new(
        store.clone(),
        cache.clone(),
        config.cache.default_ttl,
    ));
    let link_service = web::Data::new(LinkService::new(store.clone(), cache.clone()));
    let user_service = web::Data::new(UserService::new(
        storage.clone() as Arc<dyn UserStore>,
        jwt.clone(),
    ));
    let jwt_data = web::Data::new(jwt);

    if config.cleanup.enabled {
        spawn_sweeper(
            store.clone(),
            config.cleanup.inactive_days_threshold,
            Duration::from_secs(config.cleanup.sweep_interval_minutes * 60),
        );
    }

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(resolver.clone())
            .app_data(link_service.clone())
            .app_data(user_service.clone())
            .app_data(jwt_data.clone())
            .service(user_routes())
            .configure(link_routes)
            .service(redirect_routes())
    })
    .workers(config.server.cpu_count)
    .bind(bind_address)?
    .run()
    .await
}
