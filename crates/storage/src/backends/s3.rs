//! S3-compatible storage backend using the AWS SDK.

use crate::error::{StorageError, StorageResult};
use crate::traits::ObjectStore;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

/// S3 object store.
///
/// Credentials come from the default AWS provider chain (env vars, shared
/// config, IAM role). Works against MinIO and other S3-compatible services
/// via `endpoint` + `force_path_style`.
#[derive(Debug)]
pub struct S3Backend {
    client: Client,
    bucket: String,
    prefix: String,
    public_base: String,
}

impl S3Backend {
    /// Create a new S3 backend.
    pub async fn new(
        bucket: &str,
        endpoint: Option<&str>,
        region: Option<&str>,
        prefix: &str,
        force_path_style: bool,
    ) -> StorageResult<Self> {
        if bucket.is_empty() {
            return Err(StorageError::Config("s3 bucket must not be empty".into()));
        }

        let region = region.unwrap_or("us-east-1").to_string();
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.clone()));
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if force_path_style {
            builder = builder.force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        let public_base = match endpoint {
            Some(url) => format!("{}/{}", url.trim_end_matches('/'), bucket),
            None => format!("https://{bucket}.s3.{region}.amazonaws.com"),
        };

        Ok(Self {
            client,
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
            public_base,
        })
    }

    fn object_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix, key)
        }
    }
}

fn s3_err<E>(err: E) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StorageError::S3(Box::new(err))
}

#[async_trait]
impl ObjectStore for S3Backend {
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(s3_err)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    StorageError::NotFound(key.to_string())
                } else {
                    s3_err(service_err)
                }
            })?;

        let data = resp.body.collect().await.map_err(s3_err)?;
        Ok(data.into_bytes())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        // S3 DeleteObject succeeds on missing keys, which is exactly the
        // idempotent cleanup semantics the upload pipeline relies on.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await
            .map_err(s3_err)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(s3_err(service_err))
                }
            }
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, self.object_key(key))
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(s3_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn url_resolution_virtual_hosted() {
        let backend = S3Backend::new("mybucket", None, Some("eu-west-1"), "ecocart", false)
            .await
            .unwrap();
        assert_eq!(
            backend.url_for("items/a.jpg"),
            "https://mybucket.s3.eu-west-1.amazonaws.com/ecocart/items/a.jpg"
        );
    }

    #[tokio::test]
    async fn url_resolution_custom_endpoint() {
        let backend = S3Backend::new(
            "mybucket",
            Some("http://localhost:9000/"),
            None,
            "ecocart",
            true,
        )
        .await
        .unwrap();
        assert_eq!(
            backend.url_for("items/a.jpg"),
            "http://localhost:9000/mybucket/ecocart/items/a.jpg"
        );
    }

    #[tokio::test]
    async fn empty_prefix_is_omitted() {
        let backend = S3Backend::new("b", None, None, "", false).await.unwrap();
        assert_eq!(
            backend.url_for("items/a.jpg"),
            "https://b.s3.us-east-1.amazonaws.com/items/a.jpg"
        );
    }

    #[tokio::test]
    async fn rejects_empty_bucket() {
        let err = S3Backend::new("", None, None, "ecocart", false)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Config(_)));
    }
}
