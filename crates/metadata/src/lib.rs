//! Metadata store abstraction and implementation for EcoCart.
//!
//! This crate provides the control-plane data model:
//! - User accounts and roles
//! - Item listings and the one-shot claim transition
//! - Bearer tokens for authentication

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use repos::items::ClaimOutcome;
pub use store::{MetadataStore, SqliteStore};

use ecocart_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    match config {
        MetadataConfig::Sqlite { path } => {
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}
