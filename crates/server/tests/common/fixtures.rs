//! Test fixtures: users, tokens, and multipart form bodies.

use super::server::TestServer;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use ecocart_metadata::models::{TokenRow, UserRow};
use serde_json::Value;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

/// SHA256 hex digest, matching the server's token hashing.
#[allow(dead_code)]
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Create a user with the given role and return it with a usable raw token.
#[allow(dead_code)]
pub async fn create_user_with_token(
    server: &TestServer,
    name: &str,
    role: &str,
) -> (UserRow, String) {
    let now = OffsetDateTime::now_utc();
    let user = UserRow {
        user_id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}-{}@test.local", name.to_lowercase(), Uuid::new_v4()),
        role: role.to_string(),
        created_at: now,
    };
    server
        .metadata()
        .create_user(&user)
        .await
        .expect("Failed to create user");

    let raw_token = format!("test-token-{}", Uuid::new_v4());
    let token = TokenRow {
        token_id: Uuid::new_v4(),
        user_id: user.user_id,
        token_hash: sha256_hex(raw_token.as_bytes()),
        expires_at: None,
        revoked_at: None,
        created_at: now,
        last_used_at: None,
        description: Some("Test token".to_string()),
    };
    server
        .metadata()
        .create_token(&token)
        .await
        .expect("Failed to create token");

    (user, raw_token)
}

/// A tiny but valid JPEG header, enough to stand in for a real photo.
#[allow(dead_code)]
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.resize(len.max(4), 0xAB);
    data
}

/// Incremental multipart/form-data body builder.
#[allow(dead_code)]
pub struct MultipartBuilder {
    boundary: String,
    body: Vec<u8>,
}

#[allow(dead_code)]
impl MultipartBuilder {
    pub fn new() -> Self {
        Self {
            boundary: format!("----ecocart-test-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Finish the body; returns the Content-Type header value and the bytes.
    pub fn build(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// Builder pre-filled with a complete, valid item form.
#[allow(dead_code)]
pub fn item_form() -> MultipartBuilder {
    MultipartBuilder::new()
        .text("title", "Lamp")
        .text("description", "Desk lamp")
        .text("category", "furniture")
        .text("condition", "used")
        .text("location", "Boston")
}

/// Make a request and decode the JSON body.
#[allow(dead_code)]
pub async fn request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    auth_token: Option<&str>,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = auth_token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    if let Some(content_type) = content_type {
        builder = builder.header("Content-Type", content_type);
    }

    let request = builder.body(Body::from(body)).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Make a bodyless JSON request.
#[allow(dead_code)]
pub async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    auth_token: Option<&str>,
) -> (StatusCode, Value) {
    request(router, method, uri, auth_token, None, Vec::new()).await
}

/// Post a multipart item form.
#[allow(dead_code)]
pub async fn post_item(
    router: &axum::Router,
    auth_token: Option<&str>,
    form: MultipartBuilder,
) -> (StatusCode, Value) {
    let (content_type, body) = form.build();
    request(
        router,
        "POST",
        "/api/items",
        auth_token,
        Some(&content_type),
        body,
    )
    .await
}
