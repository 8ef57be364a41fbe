//! Item listing handlers: creation with image upload, browsing, the claim
//! workflow, and deletion.

use crate::auth::require_auth;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{
    ApiResponse, ItemResponse, MessageResponse, delete_item_images, item_response, parse_id,
};
use crate::state::AppState;
use crate::upload;
use axum::Json;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::StatusCode;
use ecocart_metadata::ClaimOutcome;
use ecocart_metadata::models::ItemRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// POST /api/items
///
/// Multipart body with the item's text fields and 0-3 image files. Images
/// are staged into object storage before the row is written; any failure
/// after partial acceptance deletes the already-stored objects, so a
/// created item never references an image that failed to persist.
pub async fn create_item(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<ApiResponse<ItemResponse>>)> {
    let auth = require_auth(&req)?.clone();

    let multipart = Multipart::from_request(req, &state)
        .await
        .map_err(|e| ApiError::Validation(format!("expected multipart form data: {e}")))?;

    let (fields, files) = upload::parse_item_form(multipart, &state.config.upload).await?;
    let staged = upload::store_images(state.storage.clone(), &files).await?;

    let images = serde_json::to_string(staged.keys())
        .map_err(|e| ApiError::Internal(format!("failed to encode image keys: {e}")))?;
    let item = ItemRow {
        item_id: Uuid::new_v4(),
        title: fields.title,
        description: fields.description,
        category: fields.category,
        condition: fields.condition,
        location: fields.location,
        images,
        posted_by: auth.user_id,
        claimed_by: None,
        created_at: OffsetDateTime::now_utc(),
    };

    if let Err(e) = state.metadata.create_item(&item).await {
        staged.rollback().await;
        return Err(e.into());
    }
    let image_count = staged.commit().len();

    tracing::info!(
        item_id = %item.item_id,
        posted_by = %auth.user_id,
        images = image_count,
        "item created"
    );

    let body = item_response(&state, &item).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(body))))
}

/// GET /api/items
pub async fn list_items(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<ItemResponse>>>> {
    let rows = state.metadata.list_items().await?;
    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        items.push(item_response(&state, row).await?);
    }
    Ok(Json(ApiResponse::new(items)))
}

/// GET /api/items/{item_id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<ApiResponse<ItemResponse>>> {
    let item_id = parse_id(&item_id, "item")?;
    let row = state
        .metadata
        .get_item(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;
    Ok(Json(ApiResponse::new(item_response(&state, &row).await?)))
}

/// PATCH /api/items/{item_id}/claim
///
/// One-shot ownership transfer. The store's conditional update guarantees
/// exactly one winner when two claims race; the loser gets a client error
/// and the item keeps its first claimer.
pub async fn claim_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    req: Request,
) -> ApiResult<Json<ApiResponse<ItemResponse>>> {
    let auth = require_auth(&req)?;
    let item_id = parse_id(&item_id, "item")?;

    match state.metadata.claim_item(item_id, auth.user_id).await? {
        ClaimOutcome::Claimed(row) => {
            tracing::info!(item_id = %item_id, claimed_by = %auth.user_id, "item claimed");
            Ok(Json(ApiResponse::new(item_response(&state, &row).await?)))
        }
        ClaimOutcome::AlreadyClaimed(_) => {
            Err(ApiError::Conflict("Item already claimed".to_string()))
        }
        ClaimOutcome::NotFound => Err(ApiError::NotFound("Item not found".to_string())),
    }
}

/// DELETE /api/items/{item_id}
///
/// Poster or admin only. The row is removed first, then the image objects;
/// artifact cleanup is best-effort and logged.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    req: Request,
) -> ApiResult<Json<MessageResponse>> {
    let auth = require_auth(&req)?;
    let item_id = parse_id(&item_id, "item")?;

    let item = state
        .metadata
        .get_item(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    if item.posted_by != auth.user_id && !auth.role.is_admin() {
        return Err(ApiError::Forbidden(
            "only the poster or an admin may delete this item".to_string(),
        ));
    }

    state.metadata.delete_item(item_id).await?;
    delete_item_images(&state, &item).await;

    tracing::info!(item_id = %item_id, deleted_by = %auth.user_id, "item deleted");
    Ok(Json(MessageResponse::new("Item removed")))
}
