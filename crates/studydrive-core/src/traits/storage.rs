//! Blob store trait for pluggable content storage backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for blob storage backends.
///
/// StudyDrive never interprets file bytes; it stores content under an
/// opaque `content_ref` locator and hands the locator back on download.
/// The trait is defined here in `studydrive-core` and implemented in
/// `studydrive-storage`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store a blob and return its opaque content reference.
    async fn put(&self, data: Bytes) -> AppResult<String>;

    /// Read a blob by its content reference.
    async fn get(&self, content_ref: &str) -> AppResult<Bytes>;

    /// Check whether a blob exists.
    async fn exists(&self, content_ref: &str) -> AppResult<bool>;

    /// Delete a blob by its content reference.
    ///
    /// Deleting a missing blob is a no-op; callers treat failures here as
    /// a cleanup warning, never as operation failure.
    async fn delete(&self, content_ref: &str) -> AppResult<()>;
}
