//! Application state - shared across all handlers.

use std::sync::Arc;

use serif_core::ports::{
    ContactSync, Mailer, ObjectStore, PostRepository, ProfileRepository, RateLimiter,
    UserRepository,
};
use serif_infra::database::{
    DatabaseConnections, InMemoryPostRepository, InMemoryProfileRepository,
    InMemoryUserRepository, PostgresPostRepository, PostgresProfileRepository,
    PostgresUserRepository,
};
use serif_infra::rate_limit::FixedWindowRateLimiter;
use serif_infra::storage::{FsObjectStore, InMemoryObjectStore};
use serif_infra::{DisabledContactSync, LogMailer, LoopsContactClient};

use crate::config::AppConfig;

type Repositories = (
    Arc<dyn UserRepository>,
    Arc<dyn ProfileRepository>,
    Arc<dyn PostRepository>,
);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub object_store: Arc<dyn ObjectStore>,
    pub contact_sync: Arc<dyn ContactSync>,
    pub mailer: Arc<dyn Mailer>,
    pub contact_limiter: Arc<dyn RateLimiter>,
    pub db: Option<Arc<DatabaseConnections>>,
}

/// In-memory repository stack for when no database is configured. The post
/// store shares the profile store so public reads can join author data.
fn memory_stack() -> Repositories {
    let profiles = Arc::new(InMemoryProfileRepository::new());
    let posts = Arc::new(InMemoryPostRepository::new(profiles.clone()));
    (Arc::new(InMemoryUserRepository::new()), profiles, posts)
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        // Initialize database connections if configured
        let (db, (users, profiles, posts)): (Option<Arc<DatabaseConnections>>, Repositories) = {
            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => {
                        let conn = Arc::new(connections);
                        let repos: Repositories = (
                            Arc::new(PostgresUserRepository::new(conn.main.clone())),
                            Arc::new(PostgresProfileRepository::new(conn.main.clone())),
                            Arc::new(PostgresPostRepository::new(conn.main.clone())),
                        );
                        (Some(conn), repos)
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        (None, memory_stack())
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (None, memory_stack())
            }
        };

        // Media storage: filesystem when a root is configured, otherwise an
        // in-memory store that only lives as long as the process
        let media_base_url = format!("{}/media", config.public_base_url);
        let object_store: Arc<dyn ObjectStore> = match &config.media_root {
            Some(root) => Arc::new(FsObjectStore::new(root.clone(), media_base_url)),
            None => {
                tracing::warn!("MEDIA_ROOT not set. Uploads are held in memory only.");
                Arc::new(InMemoryObjectStore::new(media_base_url))
            }
        };

        let contact_sync: Arc<dyn ContactSync> = match &config.loops_api_key {
            Some(key) => Arc::new(LoopsContactClient::new(key.clone())),
            None => Arc::new(DisabledContactSync),
        };

        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);
        let contact_limiter: Arc<dyn RateLimiter> = Arc::new(FixedWindowRateLimiter::from_env());

        tracing::info!("Application state initialized");

        Self {
            users,
            profiles,
            posts,
            object_store,
            contact_sync,
            mailer,
            contact_limiter,
            db,
        }
    }
}
