//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Abstraction over the place item images are durably kept.
///
/// Keys are forward-slash-separated relative paths generated by the
/// upload pipeline (e.g., `items/1712345678901-419301-lamp.jpg`).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object. Overwrites any existing object at the same key.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Read an object in full.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Delete an object.
    ///
    /// Deleting a missing object is a no-op, not an error, so that
    /// cleanup of partially-uploaded requests can be retried safely.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// The URL at which the object is retrievable by clients.
    ///
    /// Filesystem backends return a relative `/uploads/...` path that the
    /// server resolves against its public base URL; remote backends return
    /// an absolute URI.
    fn url_for(&self, key: &str) -> String;

    /// Verify backend connectivity at startup.
    async fn health_check(&self) -> StorageResult<()>;
}
