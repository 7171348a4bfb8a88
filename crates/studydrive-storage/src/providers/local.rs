//! Local filesystem blob store.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use studydrive_core::error::{AppError, ErrorKind};
use studydrive_core::result::AppResult;
use studydrive_core::traits::storage::BlobStore;

/// Local filesystem blob store.
///
/// Blobs are stored under `root` at a sharded path derived from a random
/// UUID (`ab/cd/abcd...`), which is returned as the opaque content
/// reference. Refs are validated on the way back in so a corrupted ref
/// can never escape the root.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a new local blob store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create blob root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Mint a fresh sharded content reference.
    fn mint_ref() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("{}/{}/{}", &id[0..2], &id[2..4], id)
    }

    /// Resolve a content reference to an absolute path within the root.
    fn resolve(&self, content_ref: &str) -> AppResult<PathBuf> {
        let valid = !content_ref.is_empty()
            && content_ref
                .split('/')
                .all(|part| !part.is_empty() && part != "." && part != "..");
        if !valid || content_ref.starts_with('/') {
            return Err(AppError::storage(format!(
                "Malformed content reference: '{content_ref}'"
            )));
        }
        Ok(self.root.join(content_ref))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn put(&self, data: Bytes) -> AppResult<String> {
        let content_ref = Self::mint_ref();
        let full_path = self.resolve(&content_ref)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create shard directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write blob: {content_ref}"),
                e,
            )
        })?;

        debug!(content_ref, bytes = data.len(), "Stored blob");
        Ok(content_ref)
    }

    async fn get(&self, content_ref: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(content_ref)?;
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {content_ref}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read blob: {content_ref}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn exists(&self, content_ref: &str) -> AppResult<bool> {
        let full_path = self.resolve(content_ref)?;
        Ok(full_path.exists())
    }

    async fn delete(&self, content_ref: &str) -> AppResult<()> {
        let full_path = self.resolve(content_ref)?;
        if full_path.exists() {
            fs::remove_file(&full_path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete blob: {content_ref}"),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let data = Bytes::from("q1 report contents");
        let content_ref = store.put(data.clone()).await.unwrap();

        assert!(store.exists(&content_ref).await.unwrap());
        assert_eq!(store.get(&content_ref).await.unwrap(), data);

        store.delete(&content_ref).await.unwrap();
        assert!(!store.exists(&content_ref).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_blob_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        store.delete("aa/bb/aabbmissing").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_missing_blob_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let err = store.get("aa/bb/aabbmissing").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_traversal_ref_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let err = store.get("../../etc/passwd").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        assert!(store.health_check().await.unwrap());
    }
}
