//! Shared types for the EcoCart item-sharing platform.
//!
//! This crate holds what every other crate needs but none should own:
//! - Application configuration (server, storage, metadata, upload limits)
//! - The user-role vocabulary used for authorization

pub mod config;
pub mod error;
pub mod role;

pub use config::{
    AdminConfig, AppConfig, MetadataConfig, ServerConfig, StorageConfig, UploadConfig,
};
pub use error::{Error, Result};
pub use role::UserRole;
