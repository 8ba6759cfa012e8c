//! In-memory object store - used when no media directory is configured and
//! in tests. Contents are lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use serif_core::ports::{ObjectStore, PutOptions, StorageError};

pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    public_base_url: String,
}

impl InMemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Read back a stored object. Test helper, not part of the port.
    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(path).cloned()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        options: PutOptions,
    ) -> Result<(), StorageError> {
        let mut objects = self.objects.write().await;
        if !options.upsert && objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_owned()));
        }
        objects.insert(path.to_owned(), bytes);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_reads_back() {
        let store = InMemoryObjectStore::new("http://localhost:8080/media");

        store
            .put("a.png", b"bytes".to_vec(), PutOptions::default())
            .await
            .unwrap();

        assert_eq!(store.get("a.png").await.as_deref(), Some(&b"bytes"[..]));
        assert_eq!(store.public_url("a.png"), "http://localhost:8080/media/a.png");
    }

    #[tokio::test]
    async fn respects_the_upsert_flag() {
        let store = InMemoryObjectStore::new("http://localhost:8080/media");

        store
            .put("a.png", b"one".to_vec(), PutOptions::default())
            .await
            .unwrap();
        let second = store.put("a.png", b"two".to_vec(), PutOptions::default()).await;
        assert!(matches!(second, Err(StorageError::AlreadyExists(_))));

        store
            .put(
                "a.png",
                b"two".to_vec(),
                PutOptions {
                    upsert: true,
                    ..PutOptions::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.get("a.png").await.as_deref(), Some(&b"two"[..]));
    }
}
