//! Object storage port.

use async_trait::async_trait;

/// Write options for object uploads.
#[derive(Debug, Clone)]
pub struct PutOptions {
    /// Cache-Control value advertised for the stored object.
    pub cache_control: Option<String>,
    /// Allow overwriting an existing object at the same path.
    pub upsert: bool,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            cache_control: None,
            upsert: false,
        }
    }
}

/// Binary object persistence with public URL issuance.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path`.
    async fn put(&self, path: &str, bytes: Vec<u8>, options: PutOptions)
    -> Result<(), StorageError>;

    /// Public URL that serves the object stored at `path`.
    fn public_url(&self, path: &str) -> String;
}

/// Object storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object already exists at {0}")]
    AlreadyExists(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}
