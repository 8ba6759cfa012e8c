//! Filesystem-backed object store.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use serif_core::ports::{ObjectStore, PutOptions, StorageError};

/// Stores objects as files under a root directory. Objects are served from a
/// public base URL by the HTTP layer, which also applies any Cache-Control
/// value, so `PutOptions::cache_control` is not persisted here.
pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Resolve an object path under the root. Only plain path segments are
    /// accepted, so an object path can never escape the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let plain = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(StorageError::Backend(format!(
                "Invalid object path: {path}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        options: PutOptions,
    ) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
        }

        let mut open = tokio::fs::OpenOptions::new();
        open.write(true);
        if options.upsert {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }

        let mut file = open.open(&target).await.map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                StorageError::AlreadyExists(path.to_owned())
            } else {
                StorageError::Backend(e.to_string())
            }
        })?;

        file.write_all(&bytes)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        tracing::debug!(object_path = %path, size = bytes.len(), "Stored object");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> FsObjectStore {
        FsObjectStore::new(dir.path(), "http://localhost:8080/media/")
    }

    #[tokio::test]
    async fn put_writes_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        store
            .put("user-1/17000-abc.png", b"bytes".to_vec(), PutOptions::default())
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("user-1/17000-abc.png")).unwrap();
        assert_eq!(written, b"bytes");
    }

    #[tokio::test]
    async fn put_without_upsert_rejects_existing_objects() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        store
            .put("a.png", b"one".to_vec(), PutOptions::default())
            .await
            .unwrap();
        let second = store.put("a.png", b"two".to_vec(), PutOptions::default()).await;

        assert!(matches!(second, Err(StorageError::AlreadyExists(_))));
        let kept = std::fs::read(dir.path().join("a.png")).unwrap();
        assert_eq!(kept, b"one");
    }

    #[tokio::test]
    async fn put_with_upsert_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let upsert = PutOptions {
            upsert: true,
            ..PutOptions::default()
        };

        store.put("a.png", b"one".to_vec(), upsert.clone()).await.unwrap();
        store.put("a.png", b"two".to_vec(), upsert).await.unwrap();

        let kept = std::fs::read(dir.path().join("a.png")).unwrap();
        assert_eq!(kept, b"two");
    }

    #[tokio::test]
    async fn traversal_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        for path in ["../escape.png", "/etc/passwd", "a/../b.png", ""] {
            let result = store.put(path, b"x".to_vec(), PutOptions::default()).await;
            assert!(matches!(result, Err(StorageError::Backend(_))), "{path}");
        }
    }

    #[test]
    fn public_url_joins_base_and_path() {
        let store = FsObjectStore::new("/tmp/media", "http://localhost:8080/media/");
        assert_eq!(
            store.public_url("user-1/a.png"),
            "http://localhost:8080/media/user-1/a.png"
        );
    }
}
