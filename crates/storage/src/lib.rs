//! Object storage for generated covers.
//!
//! [`ObjectStore`] abstracts over the local filesystem ([`LocalStore`]) and
//! S3-compatible services such as AWS S3 or Cloudflare R2 ([`S3Store`]).
//! Use [`build_store`] to pick the backend from [`StorageConfig`].

pub mod config;
pub mod local;
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;

pub use config::{StorageConfig, StorageDriver};
pub use local::LocalStore;
pub use s3::S3Store;

/// Errors from storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Metadata returned after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size: u64,
}

/// Object body plus its content type.
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// A place to keep generated images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name for logs and health output (`"local"`, `"s3"`).
    fn backend(&self) -> &'static str;

    /// Upload `bytes` under `key`, overwriting any existing object.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    async fn get(&self, key: &str) -> Result<ObjectData, StorageError>;

    /// Delete `key`. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// URL clients use to fetch `key`.
    fn public_url(&self, key: &str) -> String;
}

/// Validate a key with the shared rules, mapping to [`StorageError::InvalidKey`].
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    covergen_core::naming::validate_object_key(key)
        .map_err(|e| StorageError::InvalidKey(e.to_string()))
}

/// Join a base URL and a key with exactly one slash.
pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

/// Construct the configured backend.
pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    let store: Arc<dyn ObjectStore> = match config.driver {
        StorageDriver::Local => Arc::new(
            LocalStore::new(&config.local_dir, config.public_base_url.clone()).await?,
        ),
        StorageDriver::S3 | StorageDriver::R2 => Arc::new(S3Store::from_config(config).await?),
    };
    tracing::info!(backend = store.backend(), "Object store initialised");
    Ok(store)
}
