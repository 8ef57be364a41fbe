//! Integration tests for general API behavior: health, auth, and lookups.

mod common;

use axum::http::StatusCode;
use common::TestServer;
use common::fixtures::{create_user_with_token, item_form, json_request, post_item};
use uuid::Uuid;

#[tokio::test]
async fn health_check_is_unauthenticated() {
    let server = TestServer::new().await;

    let (status, body) = json_request(&server.router, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("ok"));
}

#[tokio::test]
async fn list_items_starts_empty() {
    let server = TestServer::new().await;

    let (status, body) = json_request(&server.router, "GET", "/api/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn create_item_requires_auth() {
    let server = TestServer::new().await;

    let (status, body) = post_item(&server.router, None, item_form()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(server.stored_file_count(), 0);
}

#[tokio::test]
async fn claim_requires_auth() {
    let server = TestServer::new().await;

    let uri = format!("/api/items/{}/claim", Uuid::new_v4());
    let (status, _) = json_request(&server.router, "PATCH", &uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_token_is_rejected() {
    let server = TestServer::new().await;

    let (status, _) = post_item(&server.router, Some("no-such-token"), item_form()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_missing_item_is_404() {
    let server = TestServer::new().await;

    let uri = format!("/api/items/{}", Uuid::new_v4());
    let (status, body) = json_request(&server.router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Item not found");
}

#[tokio::test]
async fn malformed_item_id_is_400() {
    let server = TestServer::new().await;

    let (status, _) = json_request(&server.router, "GET", "/api/items/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_item_returns_created_item() {
    let server = TestServer::new().await;
    let (user, token) = create_user_with_token(&server, "Poster", "user").await;

    let (status, body) = post_item(&server.router, Some(&token), item_form()).await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) =
        json_request(&server.router, "GET", &format!("/api/items/{item_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Lamp");
    assert_eq!(body["data"]["postedBy"]["name"], "Poster");
    assert_eq!(
        body["data"]["postedBy"]["id"].as_str().unwrap(),
        user.user_id.to_string()
    );
    assert!(body["data"]["claimedBy"].is_null());
}
