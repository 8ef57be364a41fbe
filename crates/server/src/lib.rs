//! HTTP API server for EcoCart.
//!
//! This crate provides the REST control plane:
//! - Item creation with multipart image upload and rollback-on-failure
//! - Item browsing and the one-shot claim workflow
//! - Item deletion with image artifact cleanup
//! - Admin user management
//! - Bearer-token authentication

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod upload;

pub use auth::TraceId;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
