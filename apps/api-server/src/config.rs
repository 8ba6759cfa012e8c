//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use serif_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Origin used in emailed links, the sitemap and public media URLs.
    pub public_base_url: String,
    pub database: Option<DatabaseConfig>,
    /// Directory for uploaded media. Unset means uploads stay in memory.
    pub media_root: Option<PathBuf>,
    /// Shared secret for the internal contact endpoint.
    pub internal_api_key: Option<String>,
    /// API key for the marketing contact list. Unset disables sync.
    pub loops_api_key: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        let public_base_url = env::var("SITE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            public_base_url,
            database,
            media_root: env::var("MEDIA_ROOT").ok().map(PathBuf::from),
            internal_api_key: env::var("INTERNAL_API_KEY").ok(),
            loops_api_key: env::var("LOOPS_API_KEY").ok(),
        }
    }
}
