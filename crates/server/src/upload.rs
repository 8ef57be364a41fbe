//! Multipart upload pipeline for item images.
//!
//! Turns a multipart request into zero or more durably-stored image
//! objects with no partial state left behind on failure:
//!
//! 1. Buffer the request's text fields and file parts, enforcing the
//!    file-count and per-file size ceilings while reading.
//! 2. Validate required fields and declared content types.
//! 3. Store each accepted file through the object store, tracking every
//!    written key in [`StagedImages`].
//! 4. The caller commits the staged keys after the item record persists,
//!    or rolls them back, deleting every written object best-effort.

use crate::error::{ApiError, ApiResult};
use axum::extract::Multipart;
use bytes::Bytes;
use ecocart_core::config::UploadConfig;
use ecocart_storage::ObjectStore;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;

/// Fields every item listing must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 5] = ["title", "description", "category", "condition", "location"];

/// Multipart field name carrying image file parts.
const IMAGES_FIELD: &str = "images";

/// Validated item text fields, trimmed and normalized.
#[derive(Debug, Clone)]
pub struct ItemFields {
    pub title: String,
    pub description: String,
    /// Lowercased at intake so category filtering is case-insensitive.
    pub category: String,
    pub condition: String,
    pub location: String,
}

/// A buffered file part awaiting validation and storage.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Parse a multipart item form into text fields and buffered files.
///
/// The file-count and per-file size ceilings are enforced while reading so
/// an oversized request is rejected before anything touches storage.
pub async fn parse_item_form(
    mut multipart: Multipart,
    config: &UploadConfig,
) -> ApiResult<(ItemFields, Vec<UploadedFile>)> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGES_FIELD {
            if files.len() >= config.max_files {
                return Err(ApiError::Validation(format!(
                    "Too many files: at most {} images are allowed",
                    config.max_files
                )));
            }

            let original_name = field.file_name().unwrap_or("image").to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("failed to read file part: {e}")))?;

            if data.len() > config.max_file_bytes {
                return Err(ApiError::Validation(format!(
                    "File '{}' exceeds the maximum size of {} bytes",
                    original_name, config.max_file_bytes
                )));
            }

            files.push(UploadedFile {
                original_name,
                content_type,
                data,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::Validation(format!("failed to read field '{name}': {e}")))?;
            fields.insert(name, value);
        }
    }

    let fields = validate_fields(&fields)?;
    validate_files(&files, config)?;
    Ok((fields, files))
}

/// Check required text fields, naming each absent one.
pub fn validate_fields(fields: &HashMap<String, String>) -> ApiResult<ItemFields> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|name| {
            fields
                .get(*name)
                .map(|v| v.trim().is_empty())
                .unwrap_or(true)
        })
        .collect();

    if !missing.is_empty() {
        return Err(ApiError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let get = |name: &str| fields[name].trim().to_string();
    Ok(ItemFields {
        title: get("title"),
        description: get("description"),
        category: get("category").to_lowercase(),
        condition: get("condition"),
        location: get("location"),
    })
}

/// Check every declared content type against the configured policy.
pub fn validate_files(files: &[UploadedFile], config: &UploadConfig) -> ApiResult<()> {
    for file in files {
        if !config.accepts_content_type(&file.content_type) {
            let message = if config.allow_any_image {
                "Only image files are allowed".to_string()
            } else {
                "Only JPEG, PNG, and WebP images are allowed".to_string()
            };
            return Err(ApiError::Validation(message));
        }
    }
    Ok(())
}

/// Build the object key for an uploaded file:
/// `items/{unix-millis}-{random}-{sanitized original name}`.
pub fn image_key(original_name: &str, now: OffsetDateTime, random: u32) -> String {
    let millis = (now.unix_timestamp_nanos() / 1_000_000) as i64;
    format!(
        "items/{millis}-{random}-{}",
        sanitize_filename(original_name)
    )
}

/// Reduce a client-supplied filename to a safe key segment.
fn sanitize_filename(name: &str) -> String {
    // Drop any directory part the client may have sent
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Objects written for one request, pending commit.
///
/// All cleanup for a request funnels through [`StagedImages::rollback`]
/// rather than being repeated at each error site. Deletions are
/// best-effort: a failed delete is logged and never masks the primary
/// error, and deleting an already-deleted object is a no-op.
pub struct StagedImages {
    storage: Arc<dyn ObjectStore>,
    keys: Vec<String>,
}

impl std::fmt::Debug for StagedImages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedImages")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl StagedImages {
    fn new(storage: Arc<dyn ObjectStore>) -> Self {
        Self {
            storage,
            keys: Vec::new(),
        }
    }

    /// Keys written so far, in submission order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The item record persisted; hand the keys over.
    pub fn commit(self) -> Vec<String> {
        self.keys
    }

    /// Delete every staged object.
    pub async fn rollback(self) {
        for key in &self.keys {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(key = %key, error = %e, "failed to clean up staged image");
            }
        }
    }
}

/// Store validated files, rolling back the siblings already written if any
/// single store fails.
pub async fn store_images(
    storage: Arc<dyn ObjectStore>,
    files: &[UploadedFile],
) -> ApiResult<StagedImages> {
    let mut staged = StagedImages::new(storage.clone());

    for file in files {
        let random: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        let key = image_key(&file.original_name, OffsetDateTime::now_utc(), random);

        match storage.put(&key, file.data.clone()).await {
            Ok(()) => staged.keys.push(key),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "image upload failed, rolling back siblings");
                staged.rollback().await;
                return Err(e.into());
            }
        }
    }

    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ecocart_storage::{StorageError, StorageResult};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory store that can be told to fail after N successful puts.
    struct MockStore {
        objects: Mutex<HashSet<String>>,
        fail_puts_after: Option<usize>,
        puts: Mutex<usize>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                objects: Mutex::new(HashSet::new()),
                fail_puts_after: None,
                puts: Mutex::new(0),
            }
        }

        fn failing_after(n: usize) -> Self {
            Self {
                fail_puts_after: Some(n),
                ..Self::new()
            }
        }

        fn object_count(&self) -> usize {
            self.objects.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ObjectStore for MockStore {
        async fn put(&self, key: &str, _data: Bytes) -> StorageResult<()> {
            let mut puts = self.puts.lock().unwrap();
            if let Some(limit) = self.fail_puts_after {
                if *puts >= limit {
                    return Err(StorageError::Config("simulated upload failure".into()));
                }
            }
            *puts += 1;
            self.objects.lock().unwrap().insert(key.to_string());
            Ok(())
        }

        async fn get(&self, key: &str) -> StorageResult<Bytes> {
            if self.objects.lock().unwrap().contains(key) {
                Ok(Bytes::new())
            } else {
                Err(StorageError::NotFound(key.to_string()))
            }
        }

        async fn delete(&self, key: &str) -> StorageResult<()> {
            self.objects.lock().unwrap().remove(key);
            Ok(())
        }

        async fn exists(&self, key: &str) -> StorageResult<bool> {
            Ok(self.objects.lock().unwrap().contains(key))
        }

        fn url_for(&self, key: &str) -> String {
            format!("/uploads/{key}")
        }

        async fn health_check(&self) -> StorageResult<()> {
            Ok(())
        }
    }

    fn file(name: &str, content_type: &str) -> UploadedFile {
        UploadedFile {
            original_name: name.to_string(),
            content_type: content_type.to_string(),
            data: Bytes::from_static(b"fake image bytes"),
        }
    }

    fn complete_fields() -> HashMap<String, String> {
        REQUIRED_FIELDS
            .iter()
            .map(|k| (k.to_string(), format!("{k} value")))
            .collect()
    }

    #[test]
    fn validate_fields_accepts_complete_form() {
        let mut fields = complete_fields();
        fields.insert("category".into(), "  Furniture ".into());
        let parsed = validate_fields(&fields).unwrap();
        assert_eq!(parsed.category, "furniture");
        assert_eq!(parsed.title, "title value");
    }

    #[test]
    fn validate_fields_names_each_missing_field() {
        let mut fields = complete_fields();
        fields.remove("location");
        fields.insert("condition".into(), "   ".into());

        let err = validate_fields(&fields).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: condition, location");
    }

    #[test]
    fn validate_files_rejects_disallowed_type() {
        let config = UploadConfig::default();
        assert!(validate_files(&[file("a.jpg", "image/jpeg")], &config).is_ok());

        let err = validate_files(&[file("a.gif", "image/gif")], &config).unwrap_err();
        assert_eq!(err.to_string(), "Only JPEG, PNG, and WebP images are allowed");
    }

    #[test]
    fn validate_files_any_image_mode() {
        let config = UploadConfig {
            allow_any_image: true,
            ..Default::default()
        };
        assert!(validate_files(&[file("a.gif", "image/gif")], &config).is_ok());
        let err = validate_files(&[file("a.pdf", "application/pdf")], &config).unwrap_err();
        assert_eq!(err.to_string(), "Only image files are allowed");
    }

    #[test]
    fn sanitize_filename_strips_paths_and_specials() {
        assert_eq!(sanitize_filename("lamp.jpg"), "lamp.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\photos\\cat pic.png"), "catpic.png");
        assert_eq!(sanitize_filename("???"), "image");
        assert_eq!(sanitize_filename(""), "image");
    }

    #[test]
    fn image_key_layout() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let key = image_key("lamp.jpg", now, 42);
        assert_eq!(key, "items/1700000000000-42-lamp.jpg");
    }

    #[tokio::test]
    async fn store_images_stores_all_in_order() {
        let store = Arc::new(MockStore::new());
        let files = vec![file("a.jpg", "image/jpeg"), file("b.png", "image/png")];

        let staged = store_images(store.clone(), &files).await.unwrap();
        assert_eq!(staged.keys().len(), 2);
        assert!(staged.keys()[0].ends_with("a.jpg"));
        assert!(staged.keys()[1].ends_with("b.png"));
        assert_eq!(store.object_count(), 2);

        let keys = staged.commit();
        assert_eq!(store.object_count(), 2);
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn store_images_rolls_back_siblings_on_failure() {
        let store = Arc::new(MockStore::failing_after(2));
        let files = vec![
            file("a.jpg", "image/jpeg"),
            file("b.png", "image/png"),
            file("c.webp", "image/webp"),
        ];

        let err = store_images(store.clone(), &files).await.unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
        // Both successfully-written siblings must be gone
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn rollback_deletes_staged_objects() {
        let store = Arc::new(MockStore::new());
        let files = vec![file("a.jpg", "image/jpeg")];

        let staged = store_images(store.clone(), &files).await.unwrap();
        assert_eq!(store.object_count(), 1);

        staged.rollback().await;
        assert_eq!(store.object_count(), 0);
    }
}
