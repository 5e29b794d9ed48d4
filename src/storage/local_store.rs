use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::{validate_key, ObjectStore, StorageResult};

/// Objects as plain files under `root`
pub struct LocalStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalStore {
    pub fn new(root: PathBuf, url_prefix: &str) -> Self {
        Self {
            root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> StorageResult<String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        debug!(key, size = bytes.len(), "stored object");
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::remove_file(&path).await?;
        debug!(key, "deleted object");
        Ok(())
    }

    fn url_base(&self) -> &str {
        &self.url_prefix
    }
}
