//! Core error types.

use thiserror::Error;

/// Errors for core type parsing and validation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown role: {0}")]
    InvalidRole(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
