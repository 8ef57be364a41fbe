//! User repository.

use crate::error::MetadataResult;
use crate::models::UserRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for user operations.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Create a user. Fails with `AlreadyExists` if the email is taken.
    async fn create_user(&self, user: &UserRow) -> MetadataResult<()>;

    /// Get a user by ID.
    async fn get_user(&self, user_id: Uuid) -> MetadataResult<Option<UserRow>>;

    /// Get a user by email.
    async fn get_user_by_email(&self, email: &str) -> MetadataResult<Option<UserRow>>;

    /// List all users, newest first.
    async fn list_users(&self) -> MetadataResult<Vec<UserRow>>;

    /// Delete a user. Tokens are removed by the schema's cascade;
    /// the caller is responsible for the user's items and image artifacts.
    async fn delete_user(&self, user_id: Uuid) -> MetadataResult<()>;
}
