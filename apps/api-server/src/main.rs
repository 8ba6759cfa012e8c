//! # Serif API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use serif_core::ports::{PasswordService, TokenService};
use serif_infra::{Argon2PasswordService, JwtTokenService};

mod background;
mod config;
mod handlers;
mod middleware;
mod observability;
mod state;

use background::SchedulerConfig;
use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Serif API Server on {}:{}",
        config.host,
        config.port
    );

    // Build application state
    let state = AppState::new(&config).await;

    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

    // The publish sweep runs for as long as this handle lives
    let mut scheduler = background::start_publish_sweep(
        state.posts.clone(),
        SchedulerConfig::from_env(),
    )
    .await
    .map_err(|e| std::io::Error::other(format!("Failed to start scheduler: {e}")))?;

    let media_root = config.media_root.clone();
    let host = config.host.clone();
    let port = config.port;
    let app_state = state.clone();
    let app_config = config.clone();

    // Start HTTP server
    let server = HttpServer::new(move || {
        let app = App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(password_service.clone()))
            .configure(handlers::configure_routes);

        // Serve uploaded media straight from disk when configured
        match &media_root {
            Some(root) => app.service(actix_files::Files::new("/media", root)),
            None => app,
        }
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!("Scheduler shutdown failed: {}", e);
    }

    server
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,serif_api_server=debug,serif_infra=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}
