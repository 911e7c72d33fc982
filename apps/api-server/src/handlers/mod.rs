//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod tags;
mod users;

use actix_web::web;

/// Configure all application routes.
///
/// Everything except register/login/health requires a valid bearer token;
/// the gate is the `Identity` extractor on each protected handler.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            // Session routes
            .route("/logout", web::post().to(auth::logout))
            .route("/profile", web::get().to(auth::profile))
            .service(
                web::scope("/users")
                    .route("", web::get().to(users::index))
                    .route("", web::post().to(users::store))
                    .route("/{id}", web::get().to(users::show))
                    .route("/{id}", web::put().to(users::update))
                    .route("/{id}", web::delete().to(users::destroy)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::index))
                    .route("", web::post().to(posts::store))
                    .route("/{id}", web::get().to(posts::show))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::destroy)),
            )
            .service(
                web::scope("/tags")
                    .route("", web::get().to(tags::index))
                    .route("", web::post().to(tags::store))
                    .route("/{id}", web::get().to(tags::show))
                    .route("/{id}", web::put().to(tags::update))
                    .route("/{id}", web::delete().to(tags::destroy)),
            ),
    );
}
