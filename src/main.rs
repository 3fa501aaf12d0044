use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{from_fn, Logger},
    web, App, HttpServer,
};
use std::sync::LazyLock;

use crate::{
    configs::Stores,
    constants::{
        BADGES_COLLECTION, POSTS_COLLECTION, RELATIONSHIPS_COLLECTION, REPORTS_COLLECTION,
        SESSIONS_COLLECTION, USERS_COLLECTION,
    },
    middlewares::authentication,
    modules::{
        badge::service::BadgeService,
        post::service::PostService,
        relationship::{schema::PAIR_FIELD, service::RelationshipService},
        report::service::ReportService,
        session::service::SessionService,
        user::{schema::USERNAME_FIELD, service::UserService},
    },
    sync::{SessionKeys, Synchronizer},
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod store;
mod sync;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

/// Public routes first; anything they do not match falls through to the
/// authenticated scope.
pub fn api_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(modules::user::route::public_api_configure)
            .configure(modules::post::route::public_api_configure)
            .configure(modules::badge::route::public_api_configure)
            .service(
                web::scope("")
                    .wrap(from_fn(authentication))
                    .configure(modules::user::route::configure)
                    .configure(modules::post::route::configure)
                    .configure(modules::relationship::route::configure)
                    .configure(modules::badge::route::configure)
                    .configure(modules::report::route::configure),
            ),
    );
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let stores = Stores::from_url(ENV.database_url.as_deref())
        .await
        .map_err(|_| std::io::Error::other("Database connection error"))?;

    let sync = Synchronizer::with_dependencies(
        UserService::with_store(stores.collection(USERS_COLLECTION, &[USERNAME_FIELD])),
        SessionService::with_store(stores.collection(SESSIONS_COLLECTION, &[])),
        PostService::with_store(stores.collection(POSTS_COLLECTION, &[])),
        RelationshipService::with_store(stores.collection(RELATIONSHIPS_COLLECTION, &[PAIR_FIELD])),
        BadgeService::with_store(stores.collection(BADGES_COLLECTION, &[])),
        ReportService::with_store(stores.collection(REPORTS_COLLECTION, &[])),
        SessionKeys { secret: ENV.jwt_secret.clone(), expiration: ENV.access_token_expiration },
    );

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(sync.clone()))
            .service(health_check)
            .configure(api_configure)
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(ENV.workers)
    .run()
    .await
}
