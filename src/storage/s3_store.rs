use async_trait::async_trait;
use s3::{bucket::Bucket, creds::Credentials, region::Region};
use tracing::{debug, info};

use super::{validate_key, ObjectStore, StorageError, StorageResult};

/// S3-compatible bucket (Minio, R2, AWS)
pub struct S3Store {
    bucket: Box<Bucket>,
    public_base: String,
}

impl S3Store {
    pub fn new(
        endpoint: &str,
        region: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
        public_url: Option<&str>,
        path_style: bool,
    ) -> StorageResult<Self> {
        let region = Region::Custom {
            region: region.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        };
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let mut bucket = Bucket::new(bucket, region, credentials)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        if path_style {
            bucket = bucket.with_path_style();
        }

        let public_base = match public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => bucket.url().trim_end_matches('/').to_string(),
        };

        info!(bucket = %bucket.name(), public_base = %public_base, "using S3 object store");
        Ok(Self { bucket, public_base })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<String> {
        validate_key(key)?;
        let response = self
            .bucket
            .put_object_with_content_type(key, &bytes, content_type)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Backend(format!("PUT {} returned {}", key, status)));
        }

        debug!(key, size = bytes.len(), "uploaded object");
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Backend(format!("DELETE {} returned {}", key, status)));
        }

        debug!(key, "deleted object");
        Ok(())
    }

    fn url_base(&self) -> &str {
        &self.public_base
    }
}
