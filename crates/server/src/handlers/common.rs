//! Shared handler helpers and response types.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use ecocart_core::config::ServerConfig;
use ecocart_metadata::models::ItemRow;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Success envelope, `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Success envelope for operations without a payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Minimal user reference embedded in item responses.
#[derive(Debug, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
}

/// Item as presented over the API, images resolved to retrievable URIs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub location: String,
    pub images: Vec<String>,
    pub posted_by: Option<UserRef>,
    pub claimed_by: Option<UserRef>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Resolve a stored image URL for clients.
///
/// Filesystem-backed objects yield relative `/uploads/...` paths and are
/// joined with the configured public base URL; remote objects are already
/// absolute.
pub fn resolve_image_url(config: &ServerConfig, url: String) -> String {
    if url.starts_with('/') {
        format!("{}{}", config.public_base_url.trim_end_matches('/'), url)
    } else {
        url
    }
}

/// Look up a user reference, tolerating since-deleted accounts.
async fn user_ref(state: &AppState, user_id: Option<Uuid>) -> ApiResult<Option<UserRef>> {
    let Some(user_id) = user_id else {
        return Ok(None);
    };
    let user = state.metadata.get_user(user_id).await?;
    Ok(user.map(|u| UserRef {
        id: u.user_id,
        name: u.name,
    }))
}

/// Build the API representation of an item row.
pub async fn item_response(state: &AppState, row: &ItemRow) -> ApiResult<ItemResponse> {
    let keys = row.image_keys().map_err(|e| {
        ApiError::Internal(format!("corrupt images column for item {}: {e}", row.item_id))
    })?;
    let images = keys
        .iter()
        .map(|key| resolve_image_url(&state.config.server, state.storage.url_for(key)))
        .collect();

    Ok(ItemResponse {
        id: row.item_id,
        title: row.title.clone(),
        description: row.description.clone(),
        category: row.category.clone(),
        condition: row.condition.clone(),
        location: row.location.clone(),
        images,
        posted_by: user_ref(state, Some(row.posted_by)).await?,
        claimed_by: user_ref(state, row.claimed_by).await?,
        created_at: row.created_at,
    })
}

/// Delete an item's image objects, best-effort.
///
/// Failures are logged and never surfaced; the item row is already gone and
/// a stray object is preferable to a failed delete response.
pub async fn delete_item_images(state: &AppState, item: &ItemRow) {
    let keys = match item.image_keys() {
        Ok(keys) => keys,
        Err(e) => {
            tracing::warn!(item_id = %item.item_id, error = %e, "corrupt images column, skipping artifact cleanup");
            return;
        }
    };
    for key in keys {
        if let Err(e) = state.storage.delete(&key).await {
            tracing::warn!(item_id = %item.item_id, key = %key, error = %e, "failed to delete image artifact");
        }
    }
}

/// Parse a path segment as a UUID.
pub fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| ApiError::Validation(format!("invalid {what} ID: {e}")))
}

/// Liveness probe, intentionally unauthenticated.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
