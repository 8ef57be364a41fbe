//! Admin user-management handlers.

use crate::auth::require_auth;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{ApiResponse, MessageResponse, delete_item_images, parse_id};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// User as presented to administrators.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let auth = require_auth(&req)?;
    auth.require_admin()?;

    let users = state
        .metadata
        .list_users()
        .await?
        .into_iter()
        .map(|u| UserResponse {
            id: u.user_id,
            name: u.name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
        })
        .collect();
    Ok(Json(ApiResponse::new(users)))
}

/// DELETE /api/admin/users/{user_id}
///
/// Cascades: the user's posted items are removed along with their image
/// artifacts, then the account itself (tokens go with it via the schema).
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    req: Request,
) -> ApiResult<Json<MessageResponse>> {
    let auth = require_auth(&req)?;
    auth.require_admin()?;
    let user_id = parse_id(&user_id, "user")?;

    let user = state
        .metadata
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    // Safety: an admin must not remove their own account mid-session
    if user.user_id == auth.user_id {
        return Err(ApiError::Validation(
            "Admins cannot delete themselves".to_string(),
        ));
    }

    let items = state.metadata.list_items_by_poster(user.user_id).await?;
    for item in &items {
        state.metadata.delete_item(item.item_id).await?;
        delete_item_images(&state, item).await;
    }

    state.metadata.delete_user(user.user_id).await?;

    tracing::info!(
        user_id = %user.user_id,
        deleted_by = %auth.user_id,
        items = items.len(),
        "user deleted with item cascade"
    );
    Ok(Json(MessageResponse::new("User and their items removed")))
}
