//! Item repository.

use crate::error::MetadataResult;
use crate::models::ItemRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Outcome of a conditional claim update.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    /// The conditional update won; the row reflects the new claim.
    Claimed(ItemRow),
    /// Another claim already holds the item; the row is unchanged.
    AlreadyClaimed(ItemRow),
    /// No item with the given id exists.
    NotFound,
}

/// Repository for item operations.
#[async_trait]
pub trait ItemRepo: Send + Sync {
    /// Create an item.
    async fn create_item(&self, item: &ItemRow) -> MetadataResult<()>;

    /// Get an item by ID.
    async fn get_item(&self, item_id: Uuid) -> MetadataResult<Option<ItemRow>>;

    /// List all items, newest first.
    async fn list_items(&self) -> MetadataResult<Vec<ItemRow>>;

    /// List items posted by a user, newest first.
    async fn list_items_by_poster(&self, user_id: Uuid) -> MetadataResult<Vec<ItemRow>>;

    /// Atomically claim an item for a user.
    ///
    /// Issues a single conditional update (`claimed_by IS NULL` guard) so
    /// that exactly one writer wins when two claim requests race.
    async fn claim_item(&self, item_id: Uuid, user_id: Uuid) -> MetadataResult<ClaimOutcome>;

    /// Delete an item. Returns `NotFound` if no row was deleted.
    async fn delete_item(&self, item_id: Uuid) -> MetadataResult<()>;
}
