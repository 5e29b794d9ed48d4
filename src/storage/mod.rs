//! Object Storage
//!
//! Uploaded and fetched icons are written through `ObjectStore`, either to a
//! local directory served by this process or to an S3-compatible bucket.

mod local_store;
mod s3_store;

pub use local_store::LocalStore;
pub use s3_store::S3Store;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::StorageConfig;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Object store error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, returning the public URL
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<String>;

    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Prefix every public URL starts with, without a trailing slash
    fn url_base(&self) -> &str;

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.url_base(), key)
    }
}

/// Keys are relative, slash-separated, and never climb out of the store root
pub fn validate_key(key: &str) -> StorageResult<()> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if bad {
        Err(StorageError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

/// Turn a key or a public URL previously returned by `put` back into a key
pub fn key_from_reference(store: &dyn ObjectStore, reference: &str) -> StorageResult<String> {
    let reference = reference.trim();
    let without_query = reference.split(['?', '#']).next().unwrap_or_default();

    let key = without_query
        .strip_prefix(store.url_base())
        .unwrap_or(without_query)
        .trim_start_matches('/');

    validate_key(key)?;
    Ok(key.to_string())
}

pub fn build_store(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    match config {
        StorageConfig::Local { dir, url_prefix } => {
            Ok(Arc::new(LocalStore::new(dir.clone(), url_prefix)))
        }
        StorageConfig::S3 {
            endpoint,
            region,
            bucket,
            access_key,
            secret_key,
            public_url,
            path_style,
        } => Ok(Arc::new(S3Store::new(
            endpoint,
            region,
            bucket,
            access_key,
            secret_key,
            public_url.as_deref(),
            *path_style,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("logos/github.com-abc.png").is_ok());
        assert!(validate_key("uploads/1.png").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("logos/../../etc/passwd").is_err());
        assert!(validate_key("logos//x.png").is_err());
        assert!(validate_key("logos\\x.png").is_err());
    }

    #[test]
    fn test_key_from_reference() {
        let store = LocalStore::new("/tmp/unused".into(), "/logo");

        assert_eq!(key_from_reference(&store, "logos/a.png").unwrap(), "logos/a.png");
        assert_eq!(key_from_reference(&store, "/logo/logos/a.png").unwrap(), "logos/a.png");
        assert_eq!(key_from_reference(&store, "/logo/logos/a.png?v=2").unwrap(), "logos/a.png");
        assert!(key_from_reference(&store, "/logo/../config.json").is_err());
        assert!(key_from_reference(&store, "..").is_err());
    }
}
