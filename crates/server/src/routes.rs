//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, patch};
use ecocart_core::config::StorageConfig;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health check (intentionally unauthenticated for load balancers)
        .route("/api/health", get(handlers::health_check))
        // Item listings
        .route(
            "/api/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/api/items/{item_id}",
            get(handlers::get_item).delete(handlers::delete_item),
        )
        .route("/api/items/{item_id}/claim", patch(handlers::claim_item))
        // Admin user management
        .route("/api/admin/users", get(handlers::list_users))
        .route("/api/admin/users/{user_id}", delete(handlers::delete_user));

    let mut router = Router::new().merge(api_routes);

    // In filesystem mode the store root doubles as the static uploads dir
    if let StorageConfig::Filesystem { path } = &state.config.storage {
        router = router.nest_service("/uploads", ServeDir::new(path));
    }

    // Room for a full multipart request: every file at the ceiling plus
    // text fields and boundary overhead.
    let body_limit =
        state.config.upload.max_file_bytes * state.config.upload.max_files + 64 * 1024;

    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
