//! Object storage abstraction for EcoCart item images.
//!
//! Images are written once at item creation, read back through their
//! public URL, and deleted when an item (or its poster) is removed.
//! Two backends are provided:
//! - Filesystem: images live under a local directory served at `/uploads/*`
//! - S3: images live in a remote bucket and resolve to absolute URIs

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::filesystem::FilesystemBackend;
pub use backends::s3::S3Backend;
pub use error::{StorageError, StorageResult};
pub use traits::ObjectStore;

use ecocart_core::config::StorageConfig;
use std::sync::Arc;

/// Create an object store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend) as Arc<dyn ObjectStore>)
        }
        StorageConfig::S3 {
            bucket,
            endpoint,
            region,
            prefix,
            force_path_style,
        } => {
            let backend = S3Backend::new(
                bucket,
                endpoint.as_deref(),
                region.as_deref(),
                prefix.as_deref().unwrap_or("ecocart"),
                *force_path_style,
            )
            .await?;
            Ok(Arc::new(backend) as Arc<dyn ObjectStore>)
        }
    }
}
