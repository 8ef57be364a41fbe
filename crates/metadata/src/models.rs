//! Database models mapping to the metadata schema.

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User account record.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    /// Role string ("user" or "admin"), parsed via `ecocart_core::UserRole`.
    pub role: String,
    pub created_at: OffsetDateTime,
}

/// Item listing record.
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub item_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub location: String,
    /// JSON array of object-store keys, in submission order.
    pub images: String,
    /// Posting user. Set once at creation, never reassigned.
    pub posted_by: Uuid,
    /// Claiming user. Null until the claim workflow runs; set at most once.
    pub claimed_by: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

impl ItemRow {
    /// Parse the stored images column into object-store keys.
    pub fn image_keys(&self) -> serde_json::Result<Vec<String>> {
        serde_json::from_str(&self.images)
    }
}

/// Bearer token record.
#[derive(Debug, Clone, FromRow)]
pub struct TokenRow {
    pub token_id: Uuid,
    pub user_id: Uuid,
    /// SHA256 hex of the raw token. The raw token is never stored.
    pub token_hash: String,
    pub expires_at: Option<OffsetDateTime>,
    pub revoked_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub last_used_at: Option<OffsetDateTime>,
    pub description: Option<String>,
}

impl TokenRow {
    /// Whether the token is currently usable.
    pub fn is_valid(&self, now: OffsetDateTime) -> bool {
        if self.revoked_at.is_some() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => expires_at > now,
            None => true,
        }
    }
}
