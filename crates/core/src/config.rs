//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Public base URL used to resolve relative image paths in responses
    /// (e.g., "https://ecocart.example.org").
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Upload pipeline limits and content-type policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum size of a single image file in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
    /// Maximum number of image files per item.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Exact content types accepted for image uploads.
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
    /// When true, accept any `image/*` content type instead of the exact set.
    #[serde(default)]
    pub allow_any_image: bool,
}

fn default_max_file_bytes() -> usize {
    5 * 1024 * 1024 // 5 MiB
}

fn default_max_files() -> usize {
    3
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/webp".to_string(),
    ]
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            max_files: default_max_files(),
            allowed_types: default_allowed_types(),
            allow_any_image: false,
        }
    }
}

impl UploadConfig {
    /// Check a declared content type against the configured policy.
    pub fn accepts_content_type(&self, content_type: &str) -> bool {
        if self.allow_any_image {
            content_type.starts_with("image/")
        } else {
            self.allowed_types.iter().any(|t| t == content_type)
        }
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_file_bytes == 0 {
            return Err("upload.max_file_bytes must be greater than zero".to_string());
        }
        if self.max_files == 0 {
            return Err("upload.max_files must be greater than zero".to_string());
        }
        if !self.allow_any_image && self.allowed_types.is_empty() {
            return Err(
                "upload.allowed_types must not be empty unless allow_any_image is set".to_string(),
            );
        }
        Ok(())
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage, served at `/uploads/*`.
    Filesystem {
        /// Root directory for stored images.
        path: PathBuf,
    },
    /// S3-compatible object storage.
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for MinIO, etc.).
        endpoint: Option<String>,
        /// AWS region.
        region: Option<String>,
        /// Key prefix inside the bucket (default "ecocart").
        prefix: Option<String>,
        /// Force path-style URLs (`endpoint/bucket/key`). Required for MinIO
        /// and some S3-compatible services.
        #[serde(default)]
        force_path_style: bool,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/uploads"),
        }
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database file.
    Sqlite {
        /// Path to the database file.
        path: PathBuf,
    },
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/ecocart.db"),
        }
    }
}

/// Bootstrap administrator configuration.
///
/// The admin token grants initial access for moderation and user management.
/// If no user matches the configured hash at startup, an admin account and
/// token row are created.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Pre-computed hash of the admin token (SHA256 hex, 64 characters).
    /// Generate with: `echo -n "your-secret-token" | sha256sum`
    pub token_hash: String,
    /// Display name for the bootstrap admin account.
    #[serde(default = "default_admin_name")]
    pub name: String,
    /// Email for the bootstrap admin account.
    #[serde(default = "default_admin_email")]
    pub email: String,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

fn default_admin_email() -> String {
    "admin@ecocart.local".to_string()
}

impl AdminConfig {
    /// Create a test configuration with a dummy token hash.
    ///
    /// **For testing only.** The hash is deterministic but not a real token.
    pub fn for_testing() -> Self {
        Self {
            // SHA256 of "test-admin-token"
            token_hash: "9f735e0df9a1ddc702bf0a1a7b83033f9f7153a00c29de82cedadc9957289b05"
                .to_string(),
            name: default_admin_name(),
            email: default_admin_email(),
        }
    }
}

/// Top-level application configuration, constructed once at startup
/// and passed by reference into handlers via the application state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    pub admin: AdminConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_defaults() {
        let upload = UploadConfig::default();
        assert_eq!(upload.max_file_bytes, 5 * 1024 * 1024);
        assert_eq!(upload.max_files, 3);
        assert!(upload.accepts_content_type("image/jpeg"));
        assert!(upload.accepts_content_type("image/webp"));
        assert!(!upload.accepts_content_type("image/gif"));
        assert!(!upload.accepts_content_type("application/pdf"));
    }

    #[test]
    fn any_image_mode_accepts_prefix() {
        let upload = UploadConfig {
            allow_any_image: true,
            ..Default::default()
        };
        assert!(upload.accepts_content_type("image/gif"));
        assert!(!upload.accepts_content_type("video/mp4"));
    }

    #[test]
    fn upload_validation_rejects_zero_limits() {
        let mut upload = UploadConfig::default();
        upload.max_file_bytes = 0;
        assert!(upload.validate().is_err());

        let mut upload = UploadConfig::default();
        upload.max_files = 0;
        assert!(upload.validate().is_err());

        let mut upload = UploadConfig::default();
        upload.allowed_types.clear();
        assert!(upload.validate().is_err());
        upload.allow_any_image = true;
        assert!(upload.validate().is_ok());
    }
}
