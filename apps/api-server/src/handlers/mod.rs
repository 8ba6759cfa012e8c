//! HTTP handlers and route configuration.

mod auth;
mod contacts;
mod health;
mod posts;
mod profile;
mod public;
mod uploads;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/blog")
                    .route("", web::get().to(public::list_posts))
                    .route("/{slug}", web::get().to(public::get_post)),
            )
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/sign-up", web::post().to(auth::sign_up))
                    .route("/login", web::post().to(auth::login))
                    .route("/confirm", web::get().to(auth::confirm))
                    .route("/forgot-password", web::post().to(auth::forgot_password))
                    .route("/update-password", web::post().to(auth::update_password))
                    .route("/me", web::get().to(auth::me)),
            )
            // Dashboard routes, all token-protected
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("", web::get().to(posts::list_posts))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            )
            .service(
                web::scope("/profile")
                    .route("", web::get().to(profile::get_profile))
                    .route("", web::put().to(profile::update_profile)),
            )
            .route("/uploads/images", web::post().to(uploads::upload_image))
            // Internal routes
            .route("/contacts", web::post().to(contacts::sync_contact)),
    )
    // Crawler surface lives at the site root, not under /api
    .route("/sitemap.xml", web::get().to(public::sitemap))
    .route("/robots.txt", web::get().to(public::robots));
}
