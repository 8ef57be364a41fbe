//! Application state shared across handlers.

use ecocart_core::config::AppConfig;
use ecocart_metadata::MetadataStore;
use ecocart_storage::ObjectStore;
use std::sync::Arc;

/// Shared application state.
///
/// Handlers hold no mutable state of their own; the metadata store is the
/// only shared mutable resource, and the storage backend is append/delete.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, built once at startup.
    pub config: Arc<AppConfig>,
    /// Object storage backend for item images.
    pub storage: Arc<dyn ObjectStore>,
    /// Metadata store for users, items, and tokens.
    pub metadata: Arc<dyn MetadataStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Panics
    ///
    /// Panics if the upload configuration is invalid; a server with a zero
    /// file limit can never accept an item, so fail fast at startup.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        if let Err(error) = config.upload.validate() {
            panic!("Invalid upload configuration: {error}");
        }

        Self {
            config: Arc::new(config),
            storage,
            metadata,
        }
    }
}
